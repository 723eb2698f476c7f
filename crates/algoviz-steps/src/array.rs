//! Array state for the sorting visualizations.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, StepError};
use crate::event::StepEvent;

/// Smallest bar height produced by [`ArrayState::random`].
pub const MIN_BAR: i64 = 5;

/// Largest bar height produced by [`ArrayState::random`].
pub const MAX_BAR: i64 = 20;

/// Ordered values shown as bars.
///
/// The length never changes during a run; only `Swap` and `Move` events
/// mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrayState {
    values: Vec<i64>,
}

impl ArrayState {
    /// Create from explicit values.
    pub fn new(values: Vec<i64>) -> Self {
        Self { values }
    }

    /// `len` bars with deterministic pseudo-random heights in `MIN_BAR..=MAX_BAR`.
    pub fn random(len: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let values = (0..len).map(|_| rng.gen_range(MIN_BAR..=MAX_BAR)).collect();
        Self { values }
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Non-decreasing order check.
    pub fn is_sorted(&self) -> bool {
        self.values.windows(2).all(|w| w[0] <= w[1])
    }

    /// Apply one event. Events that don't concern arrays are ignored.
    pub fn apply(&mut self, event: &StepEvent) -> Result<()> {
        let len = self.values.len();
        match *event {
            StepEvent::Swap { i, j } => {
                if i >= len || j >= len {
                    return Err(StepError::InvalidReplay(format!(
                        "swap {i}<->{j} outside array of {len}"
                    )));
                }
                self.values.swap(i, j);
            }
            StepEvent::Move { index, value } => {
                let slot = self.values.get_mut(index).ok_or_else(|| {
                    StepError::InvalidReplay(format!("move to {index} outside array of {len}"))
                })?;
                *slot = value;
            }
            _ => {}
        }
        Ok(())
    }

    /// Apply a whole event sequence in order.
    pub fn replay<'a>(&mut self, events: impl IntoIterator<Item = &'a StepEvent>) -> Result<()> {
        for event in events {
            self.apply(event)?;
        }
        Ok(())
    }
}

impl From<Vec<i64>> for ArrayState {
    fn from(values: Vec<i64>) -> Self {
        Self::new(values)
    }
}
