//! Family trees - one per owning user

use crate::node::NodeId;
use crate::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a family tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TreeId(pub Ulid);

impl TreeId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for TreeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TreeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A family tree: an owner and a root node.
///
/// The root moves upward when the current root node gains a parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyTree {
    /// Unique identifier
    pub id: TreeId,

    /// Owning user (one tree per owner)
    pub owner: UserId,

    /// Current root node
    pub root: NodeId,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl FamilyTree {
    /// Create a new tree rooted at the given node
    pub fn new(owner: UserId, root: NodeId) -> Self {
        Self {
            id: TreeId::new(),
            owner,
            root,
            created_at: Utc::now(),
        }
    }
}
