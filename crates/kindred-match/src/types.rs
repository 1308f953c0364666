//! Match result types

use chrono::NaiveDate;
use kindred_core::{Person, PersonId, TreeId, User, UserId};
use serde::{Deserialize, Serialize};

/// The identity slice of a person carried in a match result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
}

impl From<&Person> for PersonSummary {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id,
            first_name: person.identity.first_name.clone(),
            last_name: person.identity.last_name.clone(),
            birthdate: person.identity.birthdate,
        }
    }
}

/// The user owning the tree a match was found in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSummary {
    pub id: UserId,
    pub username: String,
}

impl From<&User> for OwnerSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// A person in another tree that plausibly represents the same individual.
///
/// Advisory only: a match is never merged automatically, and an empty match
/// list is a normal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotentialMatch {
    /// The candidate person
    pub person: PersonSummary,

    /// The tree the candidate lives in
    pub tree: TreeId,

    /// The user owning that tree, when resolvable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerSummary>,

    /// Whether the candidate and the probed node share a relative whose
    /// identity fields all match
    pub has_common_relatives: bool,
}
