//! Person nodes - graph vertices with parent/child edges

use crate::person::PersonId;
use crate::tree::TreeId;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Maximum number of parents a node may carry
pub const MAX_PARENTS: usize = 2;

/// Unique identifier for a person node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Ulid);

impl NodeId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A vertex in the genealogy graph.
///
/// Wraps exactly one person and carries up to two parent references plus any
/// number of child references. The mutation layer keeps edges bidirectional
/// (if B lists A as a parent, A lists B as a child); inference assumes that
/// invariant and does not re-verify it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonNode {
    /// Unique identifier
    pub id: NodeId,

    /// The person this node represents
    pub person: PersonId,

    /// Parent nodes, in the order they were attached (at most two)
    #[serde(default)]
    pub parents: Vec<NodeId>,

    /// Child nodes, in insertion order
    #[serde(default)]
    pub children: Vec<NodeId>,

    /// Owning tree, once the node is placed in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<TreeId>,
}

impl PersonNode {
    /// Create a new node for a person
    pub fn new(person: PersonId) -> Self {
        Self {
            id: NodeId::new(),
            person,
            parents: Vec::new(),
            children: Vec::new(),
            tree: None,
        }
    }

    pub fn in_tree(mut self, tree: TreeId) -> Self {
        self.tree = Some(tree);
        self
    }

    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.push_parent(parent);
        self
    }

    pub fn with_child(mut self, child: NodeId) -> Self {
        self.push_child(child);
        self
    }

    /// Whether the node already lists this parent
    pub fn has_parent(&self, parent: NodeId) -> bool {
        self.parents.contains(&parent)
    }

    /// Whether the node already lists this child
    pub fn has_child(&self, child: NodeId) -> bool {
        self.children.contains(&child)
    }

    /// Whether the node is at the two-parent cap
    pub fn parents_full(&self) -> bool {
        self.parents.len() >= MAX_PARENTS
    }

    /// Append a parent edge if absent. Returns true when the edge was added.
    ///
    /// Does not enforce the parent cap; that check belongs to the mutation
    /// layer, where a violation is a user-visible error rather than a silent
    /// truncation.
    pub fn push_parent(&mut self, parent: NodeId) -> bool {
        if self.has_parent(parent) {
            return false;
        }
        self.parents.push(parent);
        true
    }

    /// Append a child edge if absent. Returns true when the edge was added.
    pub fn push_child(&mut self, child: NodeId) -> bool {
        if self.has_child(child) {
            return false;
        }
        self.children.push(child);
        true
    }

    /// The other parent of this node, given one of them
    pub fn co_parent(&self, parent: NodeId) -> Option<NodeId> {
        self.parents.iter().copied().find(|p| *p != parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_parent_is_idempotent() {
        let mut node = PersonNode::new(PersonId::new());
        let parent = NodeId::new();

        assert!(node.push_parent(parent));
        assert!(!node.push_parent(parent));
        assert_eq!(node.parents.len(), 1);
    }

    #[test]
    fn test_push_child_is_idempotent() {
        let mut node = PersonNode::new(PersonId::new());
        let child = NodeId::new();

        assert!(node.push_child(child));
        assert!(!node.push_child(child));
        assert_eq!(node.children.len(), 1);
    }

    #[test]
    fn test_parents_full() {
        let mut node = PersonNode::new(PersonId::new());
        assert!(!node.parents_full());

        node.push_parent(NodeId::new());
        node.push_parent(NodeId::new());
        assert!(node.parents_full());
    }

    #[test]
    fn test_co_parent() {
        let p1 = NodeId::new();
        let p2 = NodeId::new();
        let node = PersonNode::new(PersonId::new()).with_parent(p1).with_parent(p2);

        assert_eq!(node.co_parent(p1), Some(p2));
        assert_eq!(node.co_parent(p2), Some(p1));

        let single = PersonNode::new(PersonId::new()).with_parent(p1);
        assert_eq!(single.co_parent(p1), None);
    }
}
