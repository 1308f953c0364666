//! Whole-system match scan
//!
//! After a mutation, every other tree is scanned for persons resembling the
//! touched identity. Trees scan concurrently up to a bounded width and the
//! whole sweep runs under a deadline, since its cost grows with the number
//! of trees in the system. Gathering is set-based, so the result does not
//! depend on scatter completion order.

use futures::StreamExt;
use kindred_core::{FamilyTree, PersonId, PersonIdentity, PersonNode, Result, TreeId};
use kindred_match::{IdentityMatcher, OwnerSummary, PersonSummary, PotentialMatch};
use kindred_storage::StorageBackend;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Tuning for the cross-tree match scan
#[derive(Debug, Clone)]
pub struct MatchScanConfig {
    /// How many trees scan concurrently
    pub concurrency: usize,

    /// Wall-clock budget for the whole sweep; on expiry the scan returns
    /// whatever it has gathered
    pub deadline: Duration,
}

impl Default for MatchScanConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            deadline: Duration::from_secs(10),
        }
    }
}

/// Scan every tree other than `own_tree` for persons resembling `probe`,
/// corroborating each candidate through shared relatives of `new_node`.
///
/// Candidates are deduplicated by (person, tree) and returned in a stable
/// order. An empty result is a normal outcome.
pub async fn find_potential_matches(
    storage: Arc<dyn StorageBackend>,
    matcher: Arc<dyn IdentityMatcher>,
    config: &MatchScanConfig,
    probe: &PersonIdentity,
    new_node: &PersonNode,
    own_tree: TreeId,
) -> Result<Vec<PotentialMatch>> {
    let probe_relatives = relative_identities(storage.as_ref(), new_node).await?;

    let other_trees: Vec<FamilyTree> = storage
        .get_all_trees()
        .await?
        .into_iter()
        .filter(|t| t.id != own_tree)
        .collect();

    tracing::debug!(trees = other_trees.len(), "starting match scan");

    let mut stream = futures::stream::iter(other_trees.into_iter().map(|tree| {
        let storage = Arc::clone(&storage);
        let matcher = Arc::clone(&matcher);
        let probe = probe.clone();
        let probe_relatives = probe_relatives.clone();
        async move { scan_tree(storage, matcher, probe, probe_relatives, tree).await }
    }))
    .buffer_unordered(config.concurrency.max(1));

    let deadline = tokio::time::sleep(config.deadline);
    tokio::pin!(deadline);

    let mut seen: HashSet<(PersonId, TreeId)> = HashSet::new();
    let mut matches: Vec<PotentialMatch> = Vec::new();

    loop {
        tokio::select! {
            next = stream.next() => {
                match next {
                    Some(Ok(batch)) => {
                        for candidate in batch {
                            if seen.insert((candidate.person.id, candidate.tree)) {
                                matches.push(candidate);
                            }
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "tree scan failed, skipping");
                    }
                    None => break,
                }
            }
            _ = &mut deadline => {
                tracing::warn!(gathered = matches.len(), "match scan deadline hit, returning partial results");
                break;
            }
        }
    }

    matches.sort_by_key(|m| (m.tree, m.person.id));
    Ok(matches)
}

/// Scan a single tree for candidates
async fn scan_tree(
    storage: Arc<dyn StorageBackend>,
    matcher: Arc<dyn IdentityMatcher>,
    probe: PersonIdentity,
    probe_relatives: Vec<PersonIdentity>,
    tree: FamilyTree,
) -> Result<Vec<PotentialMatch>> {
    let persons = storage.get_persons_by_tree(tree.id).await?;
    let candidates = matcher.candidates(&probe, &persons).await?;
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let owner = storage
        .get_user(tree.owner)
        .await?
        .map(|u| OwnerSummary::from(&u));

    let mut matches = Vec::new();
    for candidate in candidates {
        // A person without a node has no relatives to corroborate against;
        // it still counts as a candidate.
        let has_common_relatives = match storage.get_node_by_person(candidate.id).await? {
            Some(candidate_node) => {
                let candidate_relatives =
                    relative_identities(storage.as_ref(), &candidate_node).await?;
                probe_relatives
                    .iter()
                    .any(|a| candidate_relatives.iter().any(|b| a.same_person(b)))
            }
            None => false,
        };

        matches.push(PotentialMatch {
            person: PersonSummary::from(&candidate),
            tree: tree.id,
            owner: owner.clone(),
            has_common_relatives,
        });
    }

    Ok(matches)
}

/// Identities of a node's parents and children
pub(crate) async fn relative_identities(
    storage: &dyn StorageBackend,
    node: &PersonNode,
) -> Result<Vec<PersonIdentity>> {
    let mut identities = Vec::new();
    for id in node.parents.iter().chain(node.children.iter()) {
        let Some(relative) = storage.get_node(*id).await? else {
            continue;
        };
        let Some(person) = storage.get_person(relative.person).await? else {
            continue;
        };
        identities.push(person.identity);
    }
    Ok(identities)
}
