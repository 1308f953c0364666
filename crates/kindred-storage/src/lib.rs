//! Kindred Storage - Storage backends for the genealogy graph
//!
//! This crate provides the graph store adapter boundary and its
//! implementations: an in-memory backend and a redb-backed file store.

pub mod error;
pub mod traits;

#[cfg(feature = "redb")]
pub mod redb;

pub mod memory;

pub use error::{StorageError, StorageResult};
pub use traits::StorageBackend;

#[cfg(feature = "redb")]
pub use redb::RedbStorage;

pub use memory::MemoryStorage;
