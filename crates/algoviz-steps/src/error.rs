//! Error types for algoviz-steps.

use thiserror::Error;

/// Result type for step generation and replay.
pub type Result<T> = std::result::Result<T, StepError>;

/// Errors raised while building generators or replaying their events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    /// The generator was given zero elements or nodes.
    #[error("input is empty")]
    EmptyInput,

    /// A delete-by-value named a value the tree does not hold.
    #[error("Node {0} not found!")]
    NotFound(i64),

    /// A node index outside the graph or tree was referenced.
    #[error("node {node} out of range (len {len})")]
    NodeOutOfRange { node: usize, len: usize },

    /// An event could not be applied to the state it was replayed against.
    #[error("cannot replay event: {0}")]
    InvalidReplay(String),

    /// An algorithm key did not match any known algorithm.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
}
