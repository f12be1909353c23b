//! Errors surfaced by genome, network and engine operations.

use crate::Role;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A vector's length does not fit the shape it is used against, e.g. a genome decoded
    /// against a structure wanting a different weight count.
    #[error("shape mismatch: expected {expected} {what}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid network structure: {0}")]
    InvalidStructure(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("weight index {index} out of range for a genome of {len} weights")]
    IndexOutOfRange { index: usize, len: usize },

    /// A persisted genome record holds a token that isn't a finite decimal number
    #[error("malformed genome record: token {position} ({token:?}) is not a finite number")]
    Format { position: usize, token: String },

    #[error("{missing} {role} genome(s) were never evaluated")]
    PendingEvaluation { role: Role, missing: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
