//! Storage backend trait definitions

use crate::error::StorageResult;
use async_trait::async_trait;
use kindred_core::{
    FamilyTree, NodeId, Person, PersonId, PersonIdentity, PersonNode, TreeId, User, UserId,
};

/// Trait for storage backend implementations.
///
/// This is the graph store adapter boundary: node/edge/person/tree reads and
/// writes, nothing smarter. Invariants (parent cap, bidirectional edges) are
/// enforced above it.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Initialize the storage (create tables, etc.)
    async fn initialize(&self) -> StorageResult<()>;

    /// Close the storage connection
    async fn close(&self) -> StorageResult<()>;

    /// Health check
    async fn health_check(&self) -> StorageResult<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Person Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Save a person record
    async fn save_person(&self, person: &Person) -> StorageResult<()>;

    /// Get a person by id
    async fn get_person(&self, id: PersonId) -> StorageResult<Option<Person>>;

    /// Find a person in a tree by identity.
    ///
    /// Names compare trimmed and case-insensitively; birthdates must be
    /// equal, with two absent birthdates counting as equal. This is the
    /// find-or-create lookup, not the cross-tree similarity filter.
    async fn find_person(
        &self,
        identity: &PersonIdentity,
        tree: TreeId,
    ) -> StorageResult<Option<Person>>;

    /// Get all persons in a tree
    async fn get_persons_by_tree(&self, tree: TreeId) -> StorageResult<Vec<Person>>;

    /// Get all persons across all trees
    async fn get_all_persons(&self) -> StorageResult<Vec<Person>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Node Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Save a node
    async fn save_node(&self, node: &PersonNode) -> StorageResult<()>;

    /// Get a node by id
    async fn get_node(&self, id: NodeId) -> StorageResult<Option<PersonNode>>;

    /// Get the node wrapping a person, if one exists
    async fn get_node_by_person(&self, person: PersonId) -> StorageResult<Option<PersonNode>>;

    /// Get all nodes in a tree
    async fn get_nodes_by_tree(&self, tree: TreeId) -> StorageResult<Vec<PersonNode>>;

    /// Append a parent edge to a node. Idempotent: an existing edge is left
    /// alone. Errors if the node does not exist.
    async fn append_parent(&self, node: NodeId, parent: NodeId) -> StorageResult<()>;

    /// Append a child edge to a node. Idempotent, like [`append_parent`].
    ///
    /// [`append_parent`]: StorageBackend::append_parent
    async fn append_child(&self, node: NodeId, child: NodeId) -> StorageResult<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Tree Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Save a tree
    async fn save_tree(&self, tree: &FamilyTree) -> StorageResult<()>;

    /// Get a tree by id
    async fn get_tree(&self, id: TreeId) -> StorageResult<Option<FamilyTree>>;

    /// Get the tree owned by a user
    async fn get_tree_by_owner(&self, owner: UserId) -> StorageResult<Option<FamilyTree>>;

    /// Get all trees
    async fn get_all_trees(&self) -> StorageResult<Vec<FamilyTree>>;

    /// Move a tree's root
    async fn update_tree_root(&self, tree: TreeId, root: NodeId) -> StorageResult<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // User Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Save a user
    async fn save_user(&self, user: &User) -> StorageResult<()>;

    /// Get a user by id
    async fn get_user(&self, id: UserId) -> StorageResult<Option<User>>;
}

/// Whether two identities resolve to the same stored person for
/// find-or-create purposes.
pub(crate) fn identity_key_matches(a: &PersonIdentity, b: &PersonIdentity) -> bool {
    a.normalized_first() == b.normalized_first()
        && a.normalized_last() == b.normalized_last()
        && a.birthdate == b.birthdate
}
