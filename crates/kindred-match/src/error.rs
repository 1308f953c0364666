//! Match error types

use thiserror::Error;

/// Result type alias for match operations
pub type MatchResult<T> = std::result::Result<T, MatchError>;

/// Match-specific error types
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Scan error: {0}")]
    Scan(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<MatchError> for kindred_core::Error {
    fn from(e: MatchError) -> Self {
        kindred_core::Error::Match(e.to_string())
    }
}
