//! In-memory node arena for kinship queries
//!
//! Walks run against a subgraph loaded once, rather than fetching per visited
//! node. Recursion depth is bounded by what was loaded, and a dangling
//! reference (a parent or child id the loader never resolved) simply ends
//! that branch.

use crate::node::{NodeId, PersonNode};
use std::collections::HashMap;

/// A set of person nodes indexed by id
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: HashMap<NodeId, PersonNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an arena from a list of nodes
    pub fn from_nodes(nodes: impl IntoIterator<Item = PersonNode>) -> Self {
        Self {
            nodes: nodes.into_iter().map(|n| (n.id, n)).collect(),
        }
    }

    /// Insert a node, replacing any previous copy
    pub fn insert(&mut self, node: PersonNode) {
        self.nodes.insert(node.id, node);
    }

    pub fn get(&self, id: NodeId) -> Option<&PersonNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PersonNode> {
        self.nodes.values()
    }
}
