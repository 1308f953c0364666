//! The tree engine: graph mutation, relationship queries, match scanning
//!
//! All operations run against an injected storage backend. Attach operations
//! are multi-write sequences; a per-engine mutex serializes them so two
//! concurrent attaches cannot interleave their read-modify-write steps.
//! Cross-process callers still race at the storage layer, but every edge
//! write is idempotent, so re-driving a half-applied attach converges.

use crate::loader;
use crate::notify::{Notification, NotificationKind, NotificationSink, NullSink};
use crate::scan::{self, MatchScanConfig};
use kindred_core::{
    classify, validate_identity, Error, FamilyTree, NodeId, Person, PersonIdentity, PersonNode,
    Relationship, Result, TreeId, User, UserId,
};
use kindred_match::{ContainmentMatcher, IdentityMatcher, PotentialMatch};
use kindred_storage::StorageBackend;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Result of an attach operation
#[derive(Debug, Clone, Serialize)]
pub struct AttachOutcome {
    /// The parent node after the mutation
    pub parent: PersonNode,

    /// The child node after the mutation
    pub child: PersonNode,

    /// Potential matches for the touched identity in other trees
    pub matches: Vec<PotentialMatch>,
}

/// The genealogy engine
pub struct TreeEngine {
    storage: Arc<dyn StorageBackend>,
    sink: Arc<dyn NotificationSink>,
    matcher: Arc<dyn IdentityMatcher>,
    scan_config: MatchScanConfig,
    mutation_lock: Mutex<()>,
}

impl TreeEngine {
    /// Create an engine over a storage backend, with a dropped notification
    /// sink and the containment matcher
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            sink: Arc::new(NullSink),
            matcher: Arc::new(ContainmentMatcher::new()),
            scan_config: MatchScanConfig::default(),
            mutation_lock: Mutex::new(()),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn IdentityMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_scan_config(mut self, config: MatchScanConfig) -> Self {
        self.scan_config = config;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a user and the person record they go by
    pub async fn create_user(&self, username: &str, identity: PersonIdentity) -> Result<User> {
        validate_identity(&identity).map_err(|e| Error::Validation(e.to_string()))?;

        let person = Person::new(identity);
        let user = User::new(username, person.id);
        self.storage.save_person(&person).await?;
        self.storage.save_user(&user).await?;

        tracing::debug!(user = %user.id, person = %person.id, "user created");
        Ok(user)
    }

    /// Create the user's family tree, rooted at a node for their own person.
    /// One tree per owner.
    pub async fn create_tree(&self, owner: UserId) -> Result<(FamilyTree, PersonNode)> {
        let user = self
            .storage
            .get_user(owner)
            .await?
            .ok_or_else(|| Error::UserNotFound(owner.to_string()))?;

        if self.storage.get_tree_by_owner(owner).await?.is_some() {
            return Err(Error::TreeExists(owner.to_string()));
        }

        let mut person = self
            .storage
            .get_person(user.person)
            .await?
            .ok_or_else(|| Error::PersonNotFound(user.person.to_string()))?;

        let node = PersonNode::new(person.id);
        let tree = FamilyTree::new(owner, node.id);
        let node = node.in_tree(tree.id);
        person.tree = Some(tree.id);
        person.updated_at = chrono::Utc::now();

        self.storage.save_tree(&tree).await?;
        self.storage.save_node(&node).await?;
        self.storage.save_person(&person).await?;

        tracing::debug!(tree = %tree.id, root = %node.id, "tree created");
        Ok((tree, node))
    }

    /// The tree owned by a user
    pub async fn get_tree(&self, owner: UserId) -> Result<FamilyTree> {
        self.storage
            .get_tree_by_owner(owner)
            .await?
            .ok_or_else(|| Error::TreeNotFound(owner.to_string()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Classify the relationship from `reference` to `destination`.
    ///
    /// Loads the subgraph reachable from both endpoints once, then runs the
    /// classifier against it. A query has no side effects.
    pub async fn get_relationship(
        &self,
        reference: NodeId,
        destination: NodeId,
    ) -> Result<Relationship> {
        let reference_node = self
            .storage
            .get_node(reference)
            .await?
            .ok_or_else(|| Error::NodeNotFound(reference.to_string()))?;
        let destination_node = self
            .storage
            .get_node(destination)
            .await?
            .ok_or_else(|| Error::NodeNotFound(destination.to_string()))?;

        let arena = loader::load_closure(self.storage.as_ref(), &[reference, destination]).await?;
        let relationship = classify(&arena, &reference_node, &destination_node);

        tracing::debug!(%reference, %destination, label = %relationship, "relationship classified");
        Ok(relationship)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Attach a child with the given identity under a parent node.
    ///
    /// Resolves or creates the person and their node, links both edge
    /// directions, back-fills the child to any established co-parent, then
    /// scans other trees for potential matches.
    pub async fn attach_child(
        &self,
        tree_id: TreeId,
        parent_id: NodeId,
        identity: PersonIdentity,
    ) -> Result<AttachOutcome> {
        let guard = self.mutation_lock.lock().await;

        let tree = self
            .storage
            .get_tree(tree_id)
            .await?
            .ok_or_else(|| Error::TreeNotFound(tree_id.to_string()))?;
        let parent_node = self
            .storage
            .get_node(parent_id)
            .await?
            .ok_or_else(|| Error::NodeNotFound(parent_id.to_string()))?;
        validate_identity(&identity).map_err(|e| Error::Validation(e.to_string()))?;

        // Resolve what already exists before writing anything, so a rejected
        // attach leaves no orphan records behind.
        let existing_person = self.storage.find_person(&identity, tree.id).await?;
        let existing_node = match &existing_person {
            Some(person) => self.storage.get_node_by_person(person.id).await?,
            None => None,
        };
        if let Some(node) = &existing_node {
            if !node.has_parent(parent_id) && node.parents_full() {
                return Err(Error::TooManyParents);
            }
        }

        let person = match existing_person {
            Some(person) => person,
            None => self.create_person(&identity, tree.id).await?,
        };
        let child_id = match existing_node {
            Some(node) => {
                self.storage.append_parent(node.id, parent_id).await?;
                node.id
            }
            None => {
                let node = PersonNode::new(person.id)
                    .in_tree(tree.id)
                    .with_parent(parent_id);
                self.storage.save_node(&node).await?;
                node.id
            }
        };
        self.storage.append_child(parent_id, child_id).await?;

        self.backfill_siblings(&parent_node, child_id, parent_id)
            .await?;

        drop(guard);

        let parent = self.reload_node(parent_id).await?;
        let child = self.reload_node(child_id).await?;

        let matches = scan::find_potential_matches(
            Arc::clone(&self.storage),
            Arc::clone(&self.matcher),
            &self.scan_config,
            &identity,
            &child,
            tree.id,
        )
        .await?;
        self.notify_matches(&tree, child.id, &matches).await;

        tracing::debug!(%parent_id, child = %child.id, matches = matches.len(), "child attached");
        Ok(AttachOutcome { parent, child, matches })
    }

    /// Attach a parent with the given identity above a child node.
    ///
    /// Rejects a third distinct parent; re-attaching an existing parent is a
    /// no-op. When the child was the tree root, the new parent takes over as
    /// root.
    pub async fn attach_parent(
        &self,
        tree_id: TreeId,
        child_id: NodeId,
        identity: PersonIdentity,
    ) -> Result<AttachOutcome> {
        let guard = self.mutation_lock.lock().await;

        let tree = self
            .storage
            .get_tree(tree_id)
            .await?
            .ok_or_else(|| Error::TreeNotFound(tree_id.to_string()))?;
        let child_node = self
            .storage
            .get_node(child_id)
            .await?
            .ok_or_else(|| Error::NodeNotFound(child_id.to_string()))?;
        validate_identity(&identity).map_err(|e| Error::Validation(e.to_string()))?;

        let existing_person = self.storage.find_person(&identity, tree.id).await?;
        let existing_node = match &existing_person {
            Some(person) => self.storage.get_node_by_person(person.id).await?,
            None => None,
        };

        let already_linked = existing_node
            .as_ref()
            .is_some_and(|node| child_node.has_parent(node.id));
        if !already_linked && child_node.parents_full() {
            return Err(Error::TooManyParents);
        }

        let person = match existing_person {
            Some(person) => person,
            None => self.create_person(&identity, tree.id).await?,
        };
        let parent_id = match existing_node {
            Some(node) => node.id,
            None => {
                let node = PersonNode::new(person.id)
                    .in_tree(tree.id)
                    .with_child(child_id);
                self.storage.save_node(&node).await?;
                node.id
            }
        };

        self.storage.append_child(parent_id, child_id).await?;
        self.storage.append_parent(child_id, parent_id).await?;

        // Ancestry grows upward from the current root
        if tree.root == child_id {
            self.storage.update_tree_root(tree.id, parent_id).await?;
            tracing::debug!(tree = %tree.id, new_root = %parent_id, "tree root promoted");
        }

        drop(guard);

        let parent = self.reload_node(parent_id).await?;
        let child = self.reload_node(child_id).await?;

        let matches = scan::find_potential_matches(
            Arc::clone(&self.storage),
            Arc::clone(&self.matcher),
            &self.scan_config,
            &identity,
            &parent,
            tree.id,
        )
        .await?;
        self.notify_matches(&tree, parent.id, &matches).await;

        tracing::debug!(parent = %parent.id, child = %child.id, matches = matches.len(), "parent attached");
        Ok(AttachOutcome { parent, child, matches })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    async fn create_person(&self, identity: &PersonIdentity, tree: TreeId) -> Result<Person> {
        let person = Person::new(identity.clone()).in_tree(tree);
        self.storage.save_person(&person).await?;
        tracing::debug!(person = %person.id, "person created");
        Ok(person)
    }

    /// Link a freshly attached child to the co-parent of any sibling that
    /// already has two parents.
    ///
    /// `parent_node` is the parent as loaded before the new child edge was
    /// appended, so its child list holds only the pre-existing siblings.
    async fn backfill_siblings(
        &self,
        parent_node: &PersonNode,
        new_child: NodeId,
        parent_id: NodeId,
    ) -> Result<()> {
        for sibling_id in &parent_node.children {
            if *sibling_id == new_child {
                continue;
            }
            let Some(sibling) = self.storage.get_node(*sibling_id).await? else {
                continue;
            };
            if sibling.parents.len() != 2 {
                continue;
            }
            let Some(co_parent) = sibling.co_parent(parent_id) else {
                continue;
            };

            // Re-read each round; an earlier sibling may have linked the
            // same co-parent already.
            let Some(child) = self.storage.get_node(new_child).await? else {
                continue;
            };
            if child.has_parent(co_parent) {
                continue;
            }
            if child.parents_full() {
                tracing::warn!(
                    child = %new_child,
                    %co_parent,
                    "skipping sibling back-fill, child already has two parents"
                );
                continue;
            }

            self.storage.append_child(co_parent, new_child).await?;
            self.storage.append_parent(new_child, co_parent).await?;
            tracing::debug!(child = %new_child, %co_parent, "sibling back-fill linked co-parent");
        }

        Ok(())
    }

    async fn reload_node(&self, id: NodeId) -> Result<PersonNode> {
        self.storage
            .get_node(id)
            .await?
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))
    }

    /// Fire-and-forget match notifications: the initiating tree's owner and
    /// every matched tree's owner hear about it; delivery failures only warn.
    async fn notify_matches(&self, tree: &FamilyTree, node: NodeId, matches: &[PotentialMatch]) {
        if matches.is_empty() {
            return;
        }

        let notification = Notification::new(
            tree.owner,
            NotificationKind::Match,
            "A potential match was found on another user's tree.",
        )
        .with_related_node(node);
        if let Err(e) = self.sink.deliver(notification).await {
            tracing::warn!(error = %e, "notification delivery failed");
        }

        for candidate in matches {
            if let Some(owner) = &candidate.owner {
                let notification = Notification::new(
                    owner.id,
                    NotificationKind::Match,
                    "A potential match was found in your family tree!",
                );
                if let Err(e) = self.sink.deliver(notification).await {
                    tracing::warn!(error = %e, "notification delivery failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemorySink;
    use chrono::NaiveDate;
    use kindred_storage::MemoryStorage;

    struct Fixture {
        engine: TreeEngine,
        sink: Arc<MemorySink>,
    }

    fn fixture() -> Fixture {
        let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
        let sink = Arc::new(MemorySink::new());
        let engine = TreeEngine::new(storage).with_sink(sink.clone());
        Fixture { engine, sink }
    }

    fn identity(first: &str, last: &str) -> PersonIdentity {
        PersonIdentity::new(first, last)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn user_with_tree(
        engine: &TreeEngine,
        username: &str,
    ) -> (UserId, FamilyTree, PersonNode) {
        let user = engine
            .create_user(username, identity(username, "Tester"))
            .await
            .unwrap();
        let (tree, root) = engine.create_tree(user.id).await.unwrap();
        (user.id, tree, root)
    }

    #[tokio::test]
    async fn test_one_tree_per_owner() {
        let f = fixture();
        let (owner, tree, _) = user_with_tree(&f.engine, "ada").await;

        assert_eq!(f.engine.get_tree(owner).await.unwrap().id, tree.id);
        assert!(matches!(
            f.engine.create_tree(owner).await,
            Err(Error::TreeExists(_))
        ));
    }

    #[tokio::test]
    async fn test_get_tree_not_found() {
        let f = fixture();
        assert!(matches!(
            f.engine.get_tree(UserId::new()).await,
            Err(Error::TreeNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_attach_child_links_both_directions() {
        let f = fixture();
        let (_, tree, root) = user_with_tree(&f.engine, "ada").await;

        let outcome = f
            .engine
            .attach_child(tree.id, root.id, identity("Byron", "Tester"))
            .await
            .unwrap();

        assert!(outcome.parent.has_child(outcome.child.id));
        assert!(outcome.child.has_parent(root.id));
        assert!(outcome.matches.is_empty());

        let label = f
            .engine
            .get_relationship(outcome.child.id, root.id)
            .await
            .unwrap()
            .label();
        assert_eq!(label, "parent");
        let label = f
            .engine
            .get_relationship(root.id, outcome.child.id)
            .await
            .unwrap()
            .label();
        assert_eq!(label, "child");
    }

    #[tokio::test]
    async fn test_attach_child_is_idempotent_on_the_edge() {
        let f = fixture();
        let (_, tree, root) = user_with_tree(&f.engine, "ada").await;

        let first = f
            .engine
            .attach_child(tree.id, root.id, identity("Byron", "Tester"))
            .await
            .unwrap();
        let second = f
            .engine
            .attach_child(tree.id, root.id, identity("Byron", "Tester"))
            .await
            .unwrap();

        assert_eq!(first.child.id, second.child.id);
        assert_eq!(second.child.parents, vec![root.id]);
        assert_eq!(second.parent.children, vec![first.child.id]);
    }

    #[tokio::test]
    async fn test_third_parent_is_rejected() {
        let f = fixture();
        let (_, tree, root) = user_with_tree(&f.engine, "ada").await;

        f.engine
            .attach_parent(tree.id, root.id, identity("Anne", "Tester"))
            .await
            .unwrap();
        f.engine
            .attach_parent(tree.id, root.id, identity("George", "Tester"))
            .await
            .unwrap();

        let rejected = f
            .engine
            .attach_parent(tree.id, root.id, identity("Third", "Tester"))
            .await;
        assert!(matches!(rejected, Err(Error::TooManyParents)));
        assert_eq!(
            rejected.unwrap_err().to_string(),
            "cannot add more than two parents"
        );

        // Re-attaching an existing parent is a no-op, not an error
        let outcome = f
            .engine
            .attach_parent(tree.id, root.id, identity("Anne", "Tester"))
            .await
            .unwrap();
        assert_eq!(outcome.child.parents.len(), 2);
    }

    #[tokio::test]
    async fn test_root_promotion() {
        let f = fixture();
        let (owner, tree, root) = user_with_tree(&f.engine, "ada").await;

        let outcome = f
            .engine
            .attach_parent(tree.id, root.id, identity("Anne", "Tester"))
            .await
            .unwrap();
        assert_eq!(f.engine.get_tree(owner).await.unwrap().root, outcome.parent.id);

        // A parent attached to a non-root node does not move the root
        let child = f
            .engine
            .attach_child(tree.id, root.id, identity("Byron", "Tester"))
            .await
            .unwrap();
        f.engine
            .attach_parent(tree.id, child.child.id, identity("Second", "Parent"))
            .await
            .unwrap();
        assert_eq!(f.engine.get_tree(owner).await.unwrap().root, outcome.parent.id);
    }

    #[tokio::test]
    async fn test_sibling_backfill() {
        let f = fixture();
        let (_, tree, root) = user_with_tree(&f.engine, "ada").await;

        // Child C under the root, with an established second parent P2
        let c = f
            .engine
            .attach_child(tree.id, root.id, identity("Casey", "Tester"))
            .await
            .unwrap();
        let p2 = f
            .engine
            .attach_parent(tree.id, c.child.id, identity("Pat", "Second"))
            .await
            .unwrap();

        // A new child D under the root is back-filled to P2
        let d = f
            .engine
            .attach_child(tree.id, root.id, identity("Drew", "Tester"))
            .await
            .unwrap();

        assert!(d.child.has_parent(p2.parent.id));
        let p2_fresh = f.engine.reload_node(p2.parent.id).await.unwrap();
        assert!(p2_fresh.has_child(d.child.id));

        let label = f
            .engine
            .get_relationship(d.child.id, c.child.id)
            .await
            .unwrap()
            .label();
        assert_eq!(label, "sibling");
    }

    #[tokio::test]
    async fn test_cousins_through_engine() {
        let f = fixture();
        let (_, tree, root) = user_with_tree(&f.engine, "ada").await;

        let grandparent = f
            .engine
            .attach_parent(tree.id, root.id, identity("Grand", "Tester"))
            .await
            .unwrap();
        let uncle = f
            .engine
            .attach_child(tree.id, grandparent.parent.id, identity("Uncle", "Tester"))
            .await
            .unwrap();
        let own_child = f
            .engine
            .attach_child(tree.id, root.id, identity("Kid", "Tester"))
            .await
            .unwrap();
        let cousin = f
            .engine
            .attach_child(tree.id, uncle.child.id, identity("Cos", "Tester"))
            .await
            .unwrap();

        let label = f
            .engine
            .get_relationship(own_child.child.id, cousin.child.id)
            .await
            .unwrap()
            .label();
        assert_eq!(label, "cousin");

        let label = f
            .engine
            .get_relationship(root.id, cousin.child.id)
            .await
            .unwrap()
            .label();
        assert_eq!(label, "nephew/niece");
    }

    #[tokio::test]
    async fn test_unknown_node_in_relationship_query() {
        let f = fixture();
        let (_, _, root) = user_with_tree(&f.engine, "ada").await;

        assert!(matches!(
            f.engine.get_relationship(root.id, NodeId::new()).await,
            Err(Error::NodeNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cross_tree_match_without_common_relatives() {
        let f = fixture();
        let (_, tree_a, root_a) = user_with_tree(&f.engine, "ada").await;
        let (owner_b, tree_b, root_b) = user_with_tree(&f.engine, "bey").await;

        let child = identity("Child", "Name").with_birthdate(date(2000, 1, 1));

        // The identity exists in tree B first
        f.engine
            .attach_child(tree_b.id, root_b.id, child.clone())
            .await
            .unwrap();

        // Adding it in tree A reports the match in B
        let outcome = f
            .engine
            .attach_child(tree_a.id, root_a.id, child)
            .await
            .unwrap();

        assert_eq!(outcome.matches.len(), 1);
        let found = &outcome.matches[0];
        assert_eq!(found.tree, tree_b.id);
        assert_eq!(found.person.first_name, "Child");
        assert!(!found.has_common_relatives);
        assert_eq!(found.owner.as_ref().unwrap().id, owner_b);

        // Both owners were notified
        let delivered = f.sink.delivered();
        assert_eq!(delivered.len(), 2);
        assert!(delivered.iter().any(|n| n.recipient == tree_a.owner));
        assert!(delivered.iter().any(|n| n.recipient == owner_b));
    }

    #[tokio::test]
    async fn test_cross_tree_match_with_common_relatives() {
        let f = fixture();
        let (_, tree_a, root_a) = user_with_tree(&f.engine, "ada").await;
        let (_, tree_b, root_b) = user_with_tree(&f.engine, "bey").await;

        let shared_parent = identity("Parent", "Shared").with_birthdate(date(1970, 6, 15));
        let child = identity("Child", "Name").with_birthdate(date(2000, 1, 1));

        // In tree B: the shared parent with the child under it
        let parent_b = f
            .engine
            .attach_child(tree_b.id, root_b.id, shared_parent.clone())
            .await
            .unwrap();
        f.engine
            .attach_child(tree_b.id, parent_b.child.id, child.clone())
            .await
            .unwrap();

        // In tree A: the same parent identity, then the same child under it
        let parent_a = f
            .engine
            .attach_child(tree_a.id, root_a.id, shared_parent)
            .await
            .unwrap();
        let outcome = f
            .engine
            .attach_child(tree_a.id, parent_a.child.id, child)
            .await
            .unwrap();

        let found = outcome
            .matches
            .iter()
            .find(|m| m.tree == tree_b.id && m.person.first_name == "Child")
            .expect("expected a match in tree B");
        assert!(found.has_common_relatives);
    }

    #[tokio::test]
    async fn test_no_match_within_own_tree() {
        let f = fixture();
        let (_, tree, root) = user_with_tree(&f.engine, "ada").await;

        let child = identity("Child", "Name").with_birthdate(date(2000, 1, 1));
        f.engine
            .attach_child(tree.id, root.id, child.clone())
            .await
            .unwrap();

        // Same identity attached again: still only the own tree, no matches
        let outcome = f.engine.attach_child(tree.id, root.id, child).await.unwrap();
        assert!(outcome.matches.is_empty());
        assert!(f.sink.delivered().is_empty());
    }

    #[tokio::test]
    async fn test_validation_rejects_empty_names() {
        let f = fixture();
        let (_, tree, root) = user_with_tree(&f.engine, "ada").await;

        let result = f
            .engine
            .attach_child(tree.id, root.id, identity("  ", "Name"))
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_attach_to_unknown_tree_or_node() {
        let f = fixture();
        let (_, tree, _) = user_with_tree(&f.engine, "ada").await;

        assert!(matches!(
            f.engine
                .attach_child(TreeId::new(), NodeId::new(), identity("A", "B"))
                .await,
            Err(Error::TreeNotFound(_))
        ));
        assert!(matches!(
            f.engine
                .attach_child(tree.id, NodeId::new(), identity("A", "B"))
                .await,
            Err(Error::NodeNotFound(_))
        ));
    }
}
