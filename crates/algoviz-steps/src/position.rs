//! Planar layout coordinates.

/// A position on the visualization plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Origin of the plane.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new position.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point on a circle of `radius` around the origin.
    pub fn on_circle(angle: f64, radius: f64) -> Self {
        Self {
            x: angle.cos() * radius,
            y: angle.sin() * radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
        assert!((b.distance(&a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn circle_points_have_radius() {
        for i in 0..6 {
            let p = Position::on_circle(i as f64, 2.5);
            assert!((p.distance(&Position::ORIGIN) - 2.5).abs() < 1e-9);
        }
    }
}
