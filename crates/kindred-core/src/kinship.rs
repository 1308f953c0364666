//! Kinship inference: generation walks, sibling detection, collateral
//! relationships, and the ordered classifier.
//!
//! All walks preserve the deterministic visit order of the edges as stored:
//! the first-listed parent's whole lineage is explored before the second
//! parent's. Where a node has two parents with asymmetric lineages, the
//! first match along that order wins; this is deliberately *not* a
//! shortest-path answer. The cousin resolver likewise pairs ancestors by
//! their position in the visit-ordered ancestor list.

use crate::arena::NodeArena;
use crate::limits::MAX_WALK_DEPTH;
use crate::node::{NodeId, PersonNode};
use serde::{Deserialize, Serialize};

/// A classified kinship relationship between a reference node and a
/// destination node, as seen from the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relationship {
    /// Destination is the reference's ancestor at this generation distance
    Ancestor(u32),
    /// Destination is the reference's descendant at this generation distance
    Descendant(u32),
    Sibling,
    UncleAunt,
    NephewNiece,
    Cousin { degree: u32, removal: u32 },
    None,
}

impl Relationship {
    /// The user-facing label for this relationship
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ancestor(generation) => write!(f, "{}", generation_label(*generation, "parent")),
            Self::Descendant(generation) => {
                write!(f, "{}", generation_label(*generation, "child"))
            }
            Self::Sibling => write!(f, "sibling"),
            Self::UncleAunt => write!(f, "uncle/aunt"),
            Self::NephewNiece => write!(f, "nephew/niece"),
            Self::Cousin { degree, removal } => {
                if *degree == 1 {
                    write!(f, "cousin")?;
                } else {
                    write!(f, "{} cousin", degree)?;
                }
                if *removal > 0 {
                    write!(f, " {} times removed", removal)?;
                }
                Ok(())
            }
            Self::None => write!(f, "no relationship"),
        }
    }
}

/// Map a generation distance to its label: 1 is the direct relation, 2 the
/// "grand" form, and each step beyond prefixes one more "great-".
fn generation_label(generation: u32, direct: &str) -> String {
    match generation {
        0 | 1 => direct.to_string(),
        2 => format!("grand{}", direct),
        n => format!("{}grand{}", "great-".repeat((n - 2) as usize), direct),
    }
}

/// Generation distance at which `target` appears among the ancestors of
/// `node`, or `None` if it never does.
///
/// Depth-first over the parent edges in listed order; the first match wins.
pub fn ancestor_generation(arena: &NodeArena, target: NodeId, node: &PersonNode) -> Option<u32> {
    let mut stack: Vec<(NodeId, u32)> = Vec::new();
    for parent in node.parents.iter().rev() {
        stack.push((*parent, 1));
    }

    while let Some((candidate, generation)) = stack.pop() {
        if candidate == target {
            tracing::debug!(%target, generation, "ancestor found");
            return Some(generation);
        }
        if generation >= MAX_WALK_DEPTH {
            continue;
        }
        if let Some(candidate_node) = arena.get(candidate) {
            for parent in candidate_node.parents.iter().rev() {
                stack.push((*parent, generation + 1));
            }
        }
    }

    None
}

/// Generation distance at which `target` appears among the descendants of
/// `node`, starting the count at `start_generation`, or `None`.
///
/// Symmetric to [`ancestor_generation`] over the child edges.
pub fn descendant_generation(
    arena: &NodeArena,
    target: NodeId,
    node: &PersonNode,
    start_generation: u32,
) -> Option<u32> {
    let mut stack: Vec<(NodeId, u32)> = Vec::new();
    for child in node.children.iter().rev() {
        stack.push((*child, start_generation));
    }

    while let Some((candidate, generation)) = stack.pop() {
        if candidate == target {
            tracing::debug!(%target, generation, "descendant found");
            return Some(generation);
        }
        if generation >= MAX_WALK_DEPTH {
            continue;
        }
        if let Some(candidate_node) = arena.get(candidate) {
            for child in candidate_node.children.iter().rev() {
                stack.push((*child, generation + 1));
            }
        }
    }

    None
}

/// Siblings share at least one parent. Two parentless nodes are never
/// siblings.
pub fn are_siblings(a: &PersonNode, b: &PersonNode) -> bool {
    a.parents.iter().any(|p| b.parents.contains(p))
}

/// Every ancestor of `node` in depth-first visit order: each parent followed
/// by that parent's full ancestor list, then the next parent.
///
/// An ancestor reachable along more than one branch appears once per visit;
/// duplicates are kept on purpose, because the cousin resolver pairs
/// ancestors by list position.
pub fn ancestors_of(arena: &NodeArena, node: &PersonNode) -> Vec<NodeId> {
    let mut ancestors = Vec::new();
    let mut stack: Vec<(NodeId, u32)> = Vec::new();
    for parent in node.parents.iter().rev() {
        stack.push((*parent, 1));
    }

    while let Some((id, depth)) = stack.pop() {
        ancestors.push(id);
        if depth >= MAX_WALK_DEPTH {
            continue;
        }
        if let Some(ancestor_node) = arena.get(id) {
            for parent in ancestor_node.parents.iter().rev() {
                stack.push((*parent, depth + 1));
            }
        }
    }

    ancestors
}

/// Cousin relationship between two nodes, if any: the first matching pair of
/// entries across the two visit-ordered ancestor lists decides. Degree is the
/// smaller list position, removal the difference.
pub fn find_degree_cousin(arena: &NodeArena, a: &PersonNode, b: &PersonNode) -> Option<Relationship> {
    let a_ancestors = ancestors_of(arena, a);
    let b_ancestors = ancestors_of(arena, b);

    for (i, a_ancestor) in a_ancestors.iter().enumerate() {
        for (j, b_ancestor) in b_ancestors.iter().enumerate() {
            if a_ancestor == b_ancestor {
                let degree = i.min(j) as u32;
                let removal = i.abs_diff(j) as u32;
                tracing::debug!(%a_ancestor, degree, removal, "common ancestor found");
                return Some(Relationship::Cousin { degree, removal });
            }
        }
    }

    None
}

/// Uncle/aunt or nephew/niece between `reference` and `other`, checked
/// through each of the reference's parents in order.
///
/// `other` being a sibling of a parent makes it the reference's uncle or
/// aunt; `other` sitting two or more generations below a parent makes it a
/// nephew or niece. The first parent branch that yields either wins.
pub fn find_collateral(
    arena: &NodeArena,
    reference: &PersonNode,
    other: &PersonNode,
) -> Option<Relationship> {
    for parent_id in &reference.parents {
        let Some(parent) = arena.get(*parent_id) else {
            continue;
        };

        if are_siblings(parent, other) {
            return Some(Relationship::UncleAunt);
        }

        if descendant_generation(arena, other.id, parent, 2).is_some() {
            return Some(Relationship::NephewNiece);
        }
    }

    None
}

/// Classify the relationship from `reference` to `destination`.
///
/// The checks run in a fixed priority order - ancestor, descendant, sibling,
/// uncle-aunt/nephew-niece, cousin - stopping at the first hit. Swapping the
/// arguments does not always mirror the label for deep lineages; callers
/// relying on the exact outputs must keep this ordering.
pub fn classify(arena: &NodeArena, reference: &PersonNode, destination: &PersonNode) -> Relationship {
    if let Some(generation) = ancestor_generation(arena, destination.id, reference) {
        return Relationship::Ancestor(generation);
    }

    if let Some(generation) = descendant_generation(arena, destination.id, reference, 1) {
        return Relationship::Descendant(generation);
    }

    if are_siblings(reference, destination) {
        return Relationship::Sibling;
    }

    if let Some(collateral) = find_collateral(arena, reference, destination) {
        return collateral;
    }

    if let Some(cousin) = find_degree_cousin(arena, reference, destination) {
        return cousin;
    }

    Relationship::None
}
