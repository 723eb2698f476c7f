//! Error types for algoviz-player.

use thiserror::Error;

use crate::state::PlayerState;

/// Result type for sequencer operations.
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Errors returned by the sequencer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    /// `start` was called while the sequencer was not idle.
    #[error("sequencer is {0}, reset it before starting another run")]
    AlreadyRunning(PlayerState),
}
