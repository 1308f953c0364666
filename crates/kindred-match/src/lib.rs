//! Kindred Match - Cross-tree person matching
//!
//! Provides the identity matchers used to find person records in other trees
//! that plausibly represent the same individual: containment (the default)
//! and fuzzy (nucleo).

pub mod containment;
pub mod error;
pub mod traits;
pub mod types;

#[cfg(feature = "fuzzy")]
pub mod fuzzy;

pub use containment::ContainmentMatcher;
pub use error::{MatchError, MatchResult};
pub use traits::IdentityMatcher;
pub use types::{OwnerSummary, PersonSummary, PotentialMatch};

#[cfg(feature = "fuzzy")]
pub use fuzzy::FuzzyMatcher;
