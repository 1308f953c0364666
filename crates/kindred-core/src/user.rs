//! User accounts that own trees

use crate::person::PersonId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub Ulid);

impl UserId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user account. Authentication lives elsewhere; the engine only needs the
/// owner identity behind each tree and the person record the user goes by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Login/display handle
    pub username: String,

    /// The user's own person record
    pub person: PersonId,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, person: PersonId) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            person,
            created_at: Utc::now(),
        }
    }
}
