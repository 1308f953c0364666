//! In-memory storage backend for testing and embedding

use crate::error::{StorageError, StorageResult};
use crate::traits::{identity_key_matches, StorageBackend};
use async_trait::async_trait;
use kindred_core::{
    FamilyTree, NodeId, Person, PersonId, PersonIdentity, PersonNode, TreeId, User, UserId,
};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage backend
///
/// Useful for testing and temporary graphs.
pub struct MemoryStorage {
    persons: RwLock<HashMap<PersonId, Person>>,
    nodes: RwLock<HashMap<NodeId, PersonNode>>,
    trees: RwLock<HashMap<TreeId, FamilyTree>>,
    users: RwLock<HashMap<UserId, User>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            persons: RwLock::new(HashMap::new()),
            nodes: RwLock::new(HashMap::new()),
            trees: RwLock::new(HashMap::new()),
            users: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_err<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Database(format!("Lock error: {}", e))
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }

    // Person operations

    async fn save_person(&self, person: &Person) -> StorageResult<()> {
        let mut persons = self.persons.write().map_err(lock_err)?;
        persons.insert(person.id, person.clone());
        Ok(())
    }

    async fn get_person(&self, id: PersonId) -> StorageResult<Option<Person>> {
        let persons = self.persons.read().map_err(lock_err)?;
        Ok(persons.get(&id).cloned())
    }

    async fn find_person(
        &self,
        identity: &PersonIdentity,
        tree: TreeId,
    ) -> StorageResult<Option<Person>> {
        let persons = self.persons.read().map_err(lock_err)?;
        Ok(persons
            .values()
            .find(|p| p.tree == Some(tree) && identity_key_matches(&p.identity, identity))
            .cloned())
    }

    async fn get_persons_by_tree(&self, tree: TreeId) -> StorageResult<Vec<Person>> {
        let persons = self.persons.read().map_err(lock_err)?;
        Ok(persons
            .values()
            .filter(|p| p.tree == Some(tree))
            .cloned()
            .collect())
    }

    async fn get_all_persons(&self) -> StorageResult<Vec<Person>> {
        let persons = self.persons.read().map_err(lock_err)?;
        Ok(persons.values().cloned().collect())
    }

    // Node operations

    async fn save_node(&self, node: &PersonNode) -> StorageResult<()> {
        let mut nodes = self.nodes.write().map_err(lock_err)?;
        nodes.insert(node.id, node.clone());
        Ok(())
    }

    async fn get_node(&self, id: NodeId) -> StorageResult<Option<PersonNode>> {
        let nodes = self.nodes.read().map_err(lock_err)?;
        Ok(nodes.get(&id).cloned())
    }

    async fn get_node_by_person(&self, person: PersonId) -> StorageResult<Option<PersonNode>> {
        let nodes = self.nodes.read().map_err(lock_err)?;
        Ok(nodes.values().find(|n| n.person == person).cloned())
    }

    async fn get_nodes_by_tree(&self, tree: TreeId) -> StorageResult<Vec<PersonNode>> {
        let nodes = self.nodes.read().map_err(lock_err)?;
        Ok(nodes
            .values()
            .filter(|n| n.tree == Some(tree))
            .cloned()
            .collect())
    }

    async fn append_parent(&self, node: NodeId, parent: NodeId) -> StorageResult<()> {
        let mut nodes = self.nodes.write().map_err(lock_err)?;
        let entry = nodes
            .get_mut(&node)
            .ok_or_else(|| StorageError::NodeNotFound(node.to_string()))?;
        entry.push_parent(parent);
        Ok(())
    }

    async fn append_child(&self, node: NodeId, child: NodeId) -> StorageResult<()> {
        let mut nodes = self.nodes.write().map_err(lock_err)?;
        let entry = nodes
            .get_mut(&node)
            .ok_or_else(|| StorageError::NodeNotFound(node.to_string()))?;
        entry.push_child(child);
        Ok(())
    }

    // Tree operations

    async fn save_tree(&self, tree: &FamilyTree) -> StorageResult<()> {
        let mut trees = self.trees.write().map_err(lock_err)?;
        trees.insert(tree.id, tree.clone());
        Ok(())
    }

    async fn get_tree(&self, id: TreeId) -> StorageResult<Option<FamilyTree>> {
        let trees = self.trees.read().map_err(lock_err)?;
        Ok(trees.get(&id).cloned())
    }

    async fn get_tree_by_owner(&self, owner: UserId) -> StorageResult<Option<FamilyTree>> {
        let trees = self.trees.read().map_err(lock_err)?;
        Ok(trees.values().find(|t| t.owner == owner).cloned())
    }

    async fn get_all_trees(&self) -> StorageResult<Vec<FamilyTree>> {
        let trees = self.trees.read().map_err(lock_err)?;
        Ok(trees.values().cloned().collect())
    }

    async fn update_tree_root(&self, tree: TreeId, root: NodeId) -> StorageResult<()> {
        let mut trees = self.trees.write().map_err(lock_err)?;
        let entry = trees
            .get_mut(&tree)
            .ok_or_else(|| StorageError::TreeNotFound(tree.to_string()))?;
        entry.root = root;
        Ok(())
    }

    // User operations

    async fn save_user(&self, user: &User) -> StorageResult<()> {
        let mut users = self.users.write().map_err(lock_err)?;
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> StorageResult<Option<User>> {
        let users = self.users.read().map_err(lock_err)?;
        Ok(users.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        storage.initialize().await.unwrap();

        let person = Person::new(PersonIdentity::new("Ada", "Lovelace"));
        storage.save_person(&person).await.unwrap();

        let node = PersonNode::new(person.id);
        storage.save_node(&node).await.unwrap();

        let fetched = storage.get_node(node.id).await.unwrap();
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().person, person.id);

        let by_person = storage.get_node_by_person(person.id).await.unwrap();
        assert_eq!(by_person.unwrap().id, node.id);
    }

    #[tokio::test]
    async fn test_append_edges_are_idempotent() {
        let storage = MemoryStorage::new();
        let node = PersonNode::new(PersonId::new());
        let parent = NodeId::new();
        storage.save_node(&node).await.unwrap();

        storage.append_parent(node.id, parent).await.unwrap();
        storage.append_parent(node.id, parent).await.unwrap();

        let fetched = storage.get_node(node.id).await.unwrap().unwrap();
        assert_eq!(fetched.parents, vec![parent]);
    }

    #[tokio::test]
    async fn test_append_to_missing_node_fails() {
        let storage = MemoryStorage::new();
        let result = storage.append_child(NodeId::new(), NodeId::new()).await;
        assert!(matches!(result, Err(StorageError::NodeNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_person_by_identity() {
        let storage = MemoryStorage::new();
        let tree = TreeId::new();
        let person = Person::new(PersonIdentity::new("Ada", "Lovelace")).in_tree(tree);
        storage.save_person(&person).await.unwrap();

        let probe = PersonIdentity::new("  ada ", "LOVELACE");
        let found = storage.find_person(&probe, tree).await.unwrap();
        assert_eq!(found.unwrap().id, person.id);

        // Same identity in a different tree is a different person
        let missing = storage.find_person(&probe, TreeId::new()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_tree_root_update() {
        let storage = MemoryStorage::new();
        let tree = FamilyTree::new(UserId::new(), NodeId::new());
        storage.save_tree(&tree).await.unwrap();

        let new_root = NodeId::new();
        storage.update_tree_root(tree.id, new_root).await.unwrap();

        let fetched = storage.get_tree(tree.id).await.unwrap().unwrap();
        assert_eq!(fetched.root, new_root);

        let by_owner = storage.get_tree_by_owner(tree.owner).await.unwrap();
        assert_eq!(by_owner.unwrap().root, new_root);
    }
}
