//! Playback speed multipliers.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Playback speed multiplier applied to a base step delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackSpeed {
    /// 0.25x speed
    QuarterSpeed,
    /// 0.5x speed
    HalfSpeed,
    /// Normal speed (1x)
    #[default]
    Normal,
    /// 2x speed
    Double,
    /// 4x speed
    Quadruple,
    /// 10x speed
    TenX,
    /// No delay between steps
    Maximum,
}

impl PlaybackSpeed {
    pub const ALL: [PlaybackSpeed; 7] = [
        PlaybackSpeed::QuarterSpeed,
        PlaybackSpeed::HalfSpeed,
        PlaybackSpeed::Normal,
        PlaybackSpeed::Double,
        PlaybackSpeed::Quadruple,
        PlaybackSpeed::TenX,
        PlaybackSpeed::Maximum,
    ];

    /// Get the speed multiplier.
    pub fn multiplier(&self) -> f64 {
        match self {
            PlaybackSpeed::QuarterSpeed => 0.25,
            PlaybackSpeed::HalfSpeed => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::Double => 2.0,
            PlaybackSpeed::Quadruple => 4.0,
            PlaybackSpeed::TenX => 10.0,
            PlaybackSpeed::Maximum => f64::INFINITY,
        }
    }

    /// Delay between steps at this speed.
    pub fn delay(&self, base: Duration) -> Duration {
        match self {
            PlaybackSpeed::Maximum => Duration::ZERO,
            speed => base.div_f64(speed.multiplier()),
        }
    }

    /// The next faster speed, saturating at `Maximum`.
    pub fn faster(&self) -> Self {
        let index = Self::ALL.iter().position(|s| s == self).unwrap_or(2);
        Self::ALL[(index + 1).min(Self::ALL.len() - 1)]
    }

    /// The next slower speed, saturating at `QuarterSpeed`.
    pub fn slower(&self) -> Self {
        let index = Self::ALL.iter().position(|s| s == self).unwrap_or(2);
        Self::ALL[index.saturating_sub(1)]
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackSpeed::Maximum => write!(f, "max"),
            speed => write!(f, "{}x", speed.multiplier()),
        }
    }
}

impl FromStr for PlaybackSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches(['x', 'X']);
        if trimmed.eq_ignore_ascii_case("max") {
            return Ok(PlaybackSpeed::Maximum);
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|_| format!("invalid speed '{s}'"))?;
        Self::ALL
            .into_iter()
            .find(|speed| speed.multiplier() == value)
            .ok_or_else(|| format!("unsupported speed '{s}' (use 0.25, 0.5, 1, 2, 4, 10 or max)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_multipliers() {
        assert_eq!(PlaybackSpeed::QuarterSpeed.multiplier(), 0.25);
        assert_eq!(PlaybackSpeed::Normal.multiplier(), 1.0);
        assert_eq!(PlaybackSpeed::Double.multiplier(), 2.0);
        assert!(PlaybackSpeed::Maximum.multiplier().is_infinite());
    }

    #[test]
    fn delay_scaling() {
        let base = Duration::from_millis(1000);
        assert_eq!(PlaybackSpeed::Normal.delay(base), base);
        assert_eq!(PlaybackSpeed::Double.delay(base), Duration::from_millis(500));
        assert_eq!(PlaybackSpeed::QuarterSpeed.delay(base), Duration::from_millis(4000));
        assert_eq!(PlaybackSpeed::Maximum.delay(base), Duration::ZERO);
    }

    #[test]
    fn faster_and_slower_saturate() {
        assert_eq!(PlaybackSpeed::Normal.faster(), PlaybackSpeed::Double);
        assert_eq!(PlaybackSpeed::Maximum.faster(), PlaybackSpeed::Maximum);
        assert_eq!(PlaybackSpeed::QuarterSpeed.slower(), PlaybackSpeed::QuarterSpeed);
    }

    #[test]
    fn parse_round_trip() {
        for speed in PlaybackSpeed::ALL {
            assert_eq!(speed.to_string().parse::<PlaybackSpeed>(), Ok(speed));
        }
        assert_eq!("2".parse::<PlaybackSpeed>(), Ok(PlaybackSpeed::Double));
        assert!("3".parse::<PlaybackSpeed>().is_err());
    }
}
