//! Error types for learning sessions.

use algoviz_player::PlayerError;
use algoviz_quiz::QuizError;
use algoviz_steps::StepError;
use thiserror::Error;

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that end a session step.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Steps(#[from] StepError),

    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error(transparent)]
    Quiz(#[from] QuizError),

    /// Run or quiz requested with no current algorithm.
    #[error("no algorithm selected")]
    NoAlgorithmSelected,

    /// The answerer kept submitting without a selection.
    #[error("no answer given after {0} prompts")]
    NoAnswer(usize),
}
