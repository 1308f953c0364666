//! Kindred Core - Genealogy graph engine
//!
//! This crate provides the core data types and kinship inference for the
//! Kindred genealogy system.

pub mod arena;
pub mod error;
pub mod kinship;
pub mod limits;
pub mod node;
pub mod person;
pub mod tree;
pub mod user;

pub use arena::NodeArena;
pub use error::{Error, Result};
pub use kinship::{
    ancestor_generation, ancestors_of, are_siblings, classify, descendant_generation,
    find_collateral, find_degree_cousin, Relationship,
};
pub use limits::{validate_identity, ValidationError};
pub use node::{NodeId, PersonNode, MAX_PARENTS};
pub use person::{Person, PersonId, PersonIdentity};
pub use tree::{FamilyTree, TreeId};
pub use user::{User, UserId};
