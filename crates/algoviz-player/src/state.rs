//! Sequencer lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a sequencer is in its run lifecycle.
///
/// `Idle -> Running -> (Paused <-> Running) -> Completed`, with
/// `Running | Paused -> Cancelled` and `Cancelled | Completed -> Idle` on reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    /// No run in progress; `start` is accepted.
    Idle,
    /// Delivering events.
    Running,
    /// Run suspended; delay time does not accumulate.
    Paused,
    /// Generator exhausted and `on_complete` delivered.
    Completed,
    /// Run stopped early; remaining events discarded.
    Cancelled,
}

impl PlayerState {
    /// Whether a run is in flight (running or paused).
    pub fn is_active(&self) -> bool {
        matches!(self, PlayerState::Running | PlayerState::Paused)
    }

    /// Whether the last run has ended and `reset` is needed before the next.
    pub fn is_finished(&self) -> bool {
        matches!(self, PlayerState::Completed | PlayerState::Cancelled)
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerState::Idle => write!(f, "IDLE"),
            PlayerState::Running => write!(f, "RUNNING"),
            PlayerState::Paused => write!(f, "PAUSED"),
            PlayerState::Completed => write!(f, "COMPLETED"),
            PlayerState::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_flags() {
        assert!(PlayerState::Running.is_active());
        assert!(PlayerState::Paused.is_active());
        assert!(!PlayerState::Idle.is_active());
        assert!(PlayerState::Completed.is_finished());
        assert!(PlayerState::Cancelled.is_finished());
        assert!(!PlayerState::Paused.is_finished());
    }

    #[test]
    fn display_names() {
        assert_eq!(PlayerState::Idle.to_string(), "IDLE");
        assert_eq!(PlayerState::Cancelled.to_string(), "CANCELLED");
    }
}
