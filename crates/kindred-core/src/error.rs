//! Error types for Kindred Core

use thiserror::Error;

/// Result type alias using Kindred's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Kindred error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Family tree not found: {0}")]
    TreeNotFound(String),

    #[error("Family tree already exists for user: {0}")]
    TreeExists(String),

    #[error("Person node not found: {0}")]
    NodeNotFound(String),

    #[error("Person not found: {0}")]
    PersonNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("cannot add more than two parents")]
    TooManyParents,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Match scan error: {0}")]
    Match(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ulid::DecodeError> for Error {
    fn from(e: ulid::DecodeError) -> Self {
        Error::InvalidReference(e.to_string())
    }
}
