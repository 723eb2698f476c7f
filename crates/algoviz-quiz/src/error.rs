//! Error types for algoviz-quiz.

use thiserror::Error;

use crate::engine::QuizState;

/// Result type for quiz operations.
pub type Result<T> = std::result::Result<T, QuizError>;

/// Errors returned by the quiz engine.
#[derive(Debug, Error)]
pub enum QuizError {
    /// No question bank exists for the topic.
    #[error("no quiz for topic '{0}'")]
    UnknownTopic(String),

    /// An answer was submitted without selecting an option.
    #[error("No option selected!")]
    NoSelection,

    /// The operation is not valid in the current quiz state.
    #[error("expected quiz state {expected}, was {actual}")]
    InvalidState {
        expected: QuizState,
        actual: QuizState,
    },

    /// The question banks could not be parsed.
    #[error("question bank error: {0}")]
    Bank(#[from] serde_json::Error),
}

/// Failures reported by a progress sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    /// The backing store refused or failed the write.
    #[error("progress store unavailable: {0}")]
    Unavailable(String),
}

/// Authentication failures, with the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthErrorKind {
    #[error("Username cannot be empty.")]
    MissingName,

    #[error("Email is required.")]
    MissingEmail,

    #[error("Invalid email address.")]
    InvalidEmail,

    #[error("Password is required.")]
    MissingPassword,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Account already exists. Please log in.")]
    EmailAlreadyInUse,

    #[error("Incorrect password.")]
    WrongPassword,

    #[error("No account found. Please register first.")]
    UserNotFound,

    #[error("Please verify your email before logging in.")]
    EmailNotVerified,
}
