//! ReDB storage backend

use crate::error::{StorageError, StorageResult};
use crate::traits::{identity_key_matches, StorageBackend};
use async_trait::async_trait;
use kindred_core::{
    FamilyTree, NodeId, Person, PersonId, PersonIdentity, PersonNode, TreeId, User, UserId,
};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Mutex;

// Table definitions
const PERSONS: TableDefinition<&str, &[u8]> = TableDefinition::new("persons");
const NODES: TableDefinition<&str, &[u8]> = TableDefinition::new("nodes");
const TREES: TableDefinition<&str, &[u8]> = TableDefinition::new("trees");
const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// ReDB storage backend
pub struct RedbStorage {
    db: Mutex<Database>,
}

impl RedbStorage {
    /// Open or create a ReDB database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path).map_err(|e| StorageError::Database(e.to_string()))?;

        // Initialize tables
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| StorageError::Database(e.to_string()))?;
            {
                let _ = write_txn.open_table(PERSONS);
                let _ = write_txn.open_table(NODES);
                let _ = write_txn.open_table(TREES);
                let _ = write_txn.open_table(USERS);
            }
            write_txn
                .commit()
                .map_err(|e| StorageError::Database(e.to_string()))?;
        }

        Ok(Self { db: Mutex::new(db) })
    }

    fn put<T: serde::Serialize>(
        &self,
        table: TableDefinition<&str, &[u8]>,
        key: &str,
        value: &T,
    ) -> StorageResult<()> {
        let bytes = serde_json::to_vec(value)?;

        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let write_txn = db
            .begin_write()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        {
            let mut table = write_txn.open_table(table)?;
            table.insert(key, bytes.as_slice())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        table: TableDefinition<&str, &[u8]>,
        key: &str,
    ) -> StorageResult<Option<T>> {
        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let read_txn = db
            .begin_read()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let table = read_txn.open_table(table)?;

        if let Some(value) = table.get(key)? {
            let decoded: T = serde_json::from_slice(value.value())?;
            Ok(Some(decoded))
        } else {
            Ok(None)
        }
    }

    fn scan<T: serde::de::DeserializeOwned>(
        &self,
        table: TableDefinition<&str, &[u8]>,
    ) -> StorageResult<Vec<T>> {
        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let read_txn = db
            .begin_read()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let table = read_txn.open_table(table)?;

        let mut values = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            values.push(serde_json::from_slice(value.value())?);
        }

        Ok(values)
    }

    /// Read-modify-write a node inside a single write transaction
    fn update_node<F>(&self, id: NodeId, apply: F) -> StorageResult<()>
    where
        F: FnOnce(&mut PersonNode),
    {
        let key = id.to_string();

        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let write_txn = db
            .begin_write()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        {
            let mut table = write_txn.open_table(NODES)?;
            let mut node: PersonNode = match table.get(key.as_str())? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => return Err(StorageError::NodeNotFound(key)),
            };
            apply(&mut node);
            let bytes = serde_json::to_vec(&node)?;
            table.insert(key.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;

        Ok(())
    }
}

#[async_trait]
impl StorageBackend for RedbStorage {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }

    async fn save_person(&self, person: &Person) -> StorageResult<()> {
        self.put(PERSONS, &person.id.to_string(), person)
    }

    async fn get_person(&self, id: PersonId) -> StorageResult<Option<Person>> {
        self.fetch(PERSONS, &id.to_string())
    }

    async fn find_person(
        &self,
        identity: &PersonIdentity,
        tree: TreeId,
    ) -> StorageResult<Option<Person>> {
        let persons: Vec<Person> = self.scan(PERSONS)?;
        Ok(persons
            .into_iter()
            .find(|p| p.tree == Some(tree) && identity_key_matches(&p.identity, identity)))
    }

    async fn get_persons_by_tree(&self, tree: TreeId) -> StorageResult<Vec<Person>> {
        let persons: Vec<Person> = self.scan(PERSONS)?;
        Ok(persons.into_iter().filter(|p| p.tree == Some(tree)).collect())
    }

    async fn get_all_persons(&self) -> StorageResult<Vec<Person>> {
        self.scan(PERSONS)
    }

    async fn save_node(&self, node: &PersonNode) -> StorageResult<()> {
        self.put(NODES, &node.id.to_string(), node)
    }

    async fn get_node(&self, id: NodeId) -> StorageResult<Option<PersonNode>> {
        self.fetch(NODES, &id.to_string())
    }

    async fn get_node_by_person(&self, person: PersonId) -> StorageResult<Option<PersonNode>> {
        let nodes: Vec<PersonNode> = self.scan(NODES)?;
        Ok(nodes.into_iter().find(|n| n.person == person))
    }

    async fn get_nodes_by_tree(&self, tree: TreeId) -> StorageResult<Vec<PersonNode>> {
        let nodes: Vec<PersonNode> = self.scan(NODES)?;
        Ok(nodes.into_iter().filter(|n| n.tree == Some(tree)).collect())
    }

    async fn append_parent(&self, node: NodeId, parent: NodeId) -> StorageResult<()> {
        self.update_node(node, |n| {
            n.push_parent(parent);
        })
    }

    async fn append_child(&self, node: NodeId, child: NodeId) -> StorageResult<()> {
        self.update_node(node, |n| {
            n.push_child(child);
        })
    }

    async fn save_tree(&self, tree: &FamilyTree) -> StorageResult<()> {
        self.put(TREES, &tree.id.to_string(), tree)
    }

    async fn get_tree(&self, id: TreeId) -> StorageResult<Option<FamilyTree>> {
        self.fetch(TREES, &id.to_string())
    }

    async fn get_tree_by_owner(&self, owner: UserId) -> StorageResult<Option<FamilyTree>> {
        let trees: Vec<FamilyTree> = self.scan(TREES)?;
        Ok(trees.into_iter().find(|t| t.owner == owner))
    }

    async fn get_all_trees(&self) -> StorageResult<Vec<FamilyTree>> {
        self.scan(TREES)
    }

    async fn update_tree_root(&self, tree: TreeId, root: NodeId) -> StorageResult<()> {
        let key = tree.to_string();

        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let write_txn = db
            .begin_write()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        {
            let mut table = write_txn.open_table(TREES)?;
            let mut stored: FamilyTree = match table.get(key.as_str())? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => return Err(StorageError::TreeNotFound(key)),
            };
            stored.root = root;
            let bytes = serde_json::to_vec(&stored)?;
            table.insert(key.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    async fn save_user(&self, user: &User) -> StorageResult<()> {
        self.put(USERS, &user.id.to_string(), user)
    }

    async fn get_user(&self, id: UserId) -> StorageResult<Option<User>> {
        self.fetch(USERS, &id.to_string())
    }
}
