//! Identity matcher traits

use async_trait::async_trait;
use kindred_core::{Person, PersonIdentity};

pub use crate::error::{MatchError, MatchResult as Result};

/// Trait for candidate matchers.
///
/// A matcher narrows a slice of person records down to the ones whose
/// identity fields resemble the probe. Corroboration (shared relatives) and
/// tree filtering happen in the caller; a matcher only judges identities.
#[async_trait]
pub trait IdentityMatcher: Send + Sync {
    /// Return the candidates among `persons` resembling `probe`
    async fn candidates(
        &self,
        probe: &PersonIdentity,
        persons: &[Person],
    ) -> Result<Vec<Person>>;
}
