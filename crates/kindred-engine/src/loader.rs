//! Subgraph loading
//!
//! Kinship queries run against an arena loaded once, instead of fetching
//! per visited edge mid-walk. The loader takes the closure over parent and
//! child references from the given seed nodes; walks afterwards are pure and
//! their depth is bounded by what was loaded.

use kindred_core::limits::MAX_ARENA_NODES;
use kindred_core::{NodeArena, NodeId, Result};
use kindred_storage::StorageBackend;
use std::collections::{HashSet, VecDeque};

/// Load every node reachable from the seeds through parent or child edges
pub async fn load_closure(
    storage: &dyn StorageBackend,
    seeds: &[NodeId],
) -> Result<NodeArena> {
    let mut arena = NodeArena::new();
    let mut queued: HashSet<NodeId> = seeds.iter().copied().collect();
    let mut worklist: VecDeque<NodeId> = seeds.iter().copied().collect();

    while let Some(id) = worklist.pop_front() {
        if arena.len() >= MAX_ARENA_NODES {
            tracing::warn!(loaded = arena.len(), "arena cap reached, closure truncated");
            break;
        }

        // Dangling references stay unresolved and end their branch.
        let Some(node) = storage.get_node(id).await? else {
            continue;
        };

        for neighbor in node.parents.iter().chain(node.children.iter()) {
            if queued.insert(*neighbor) {
                worklist.push_back(*neighbor);
            }
        }
        arena.insert(node);
    }

    tracing::debug!(seeds = seeds.len(), loaded = arena.len(), "arena loaded");
    Ok(arena)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindred_core::{PersonId, PersonNode};
    use kindred_storage::MemoryStorage;

    async fn save_linked(storage: &MemoryStorage, parent: &mut PersonNode, child: &mut PersonNode) {
        parent.push_child(child.id);
        child.push_parent(parent.id);
        storage.save_node(parent).await.unwrap();
        storage.save_node(child).await.unwrap();
    }

    #[tokio::test]
    async fn test_closure_reaches_both_directions() {
        let storage = MemoryStorage::new();
        let mut grandparent = PersonNode::new(PersonId::new());
        let mut parent = PersonNode::new(PersonId::new());
        let mut child = PersonNode::new(PersonId::new());

        save_linked(&storage, &mut grandparent, &mut parent).await;
        save_linked(&storage, &mut parent, &mut child).await;

        let arena = load_closure(&storage, &[parent.id]).await.unwrap();
        assert_eq!(arena.len(), 3);
        assert!(arena.contains(grandparent.id));
        assert!(arena.contains(child.id));
    }

    #[tokio::test]
    async fn test_closure_tolerates_dangling_reference() {
        let storage = MemoryStorage::new();
        let mut node = PersonNode::new(PersonId::new());
        node.push_parent(NodeId::new()); // never saved
        storage.save_node(&node).await.unwrap();

        let arena = load_closure(&storage, &[node.id]).await.unwrap();
        assert_eq!(arena.len(), 1);
    }

    #[tokio::test]
    async fn test_closure_of_unknown_seed_is_empty() {
        let storage = MemoryStorage::new();
        let arena = load_closure(&storage, &[NodeId::new()]).await.unwrap();
        assert!(arena.is_empty());
    }
}
