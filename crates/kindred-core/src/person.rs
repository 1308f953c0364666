//! Person records and the identity fields used for matching

use crate::tree::TreeId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a person record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersonId(pub Ulid);

impl PersonId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for PersonId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identity fields a person is matched on.
///
/// Matching identity is (first name, last name, birthdate); names compare
/// trimmed and case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonIdentity {
    /// Given name (required)
    pub first_name: String,

    /// Family name (required)
    pub last_name: String,

    /// Optional middle name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,

    /// Optional birthdate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
}

impl PersonIdentity {
    /// Create a new identity from the two required names
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            middle_name: None,
            birthdate: None,
        }
    }

    pub fn with_middle_name(mut self, middle_name: impl Into<String>) -> Self {
        self.middle_name = Some(middle_name.into());
        self
    }

    pub fn with_birthdate(mut self, birthdate: NaiveDate) -> Self {
        self.birthdate = Some(birthdate);
        self
    }

    /// First name normalized for comparison (trimmed, lowercased)
    pub fn normalized_first(&self) -> String {
        self.first_name.trim().to_lowercase()
    }

    /// Last name normalized for comparison (trimmed, lowercased)
    pub fn normalized_last(&self) -> String {
        self.last_name.trim().to_lowercase()
    }

    /// Whether both identities name the same person: first name, last name
    /// and birthdate must all match. A missing birthdate on either side is a
    /// non-match.
    pub fn same_person(&self, other: &PersonIdentity) -> bool {
        let names_match = self.normalized_first() == other.normalized_first()
            && self.normalized_last() == other.normalized_last();
        let birthdate_match = match (self.birthdate, other.birthdate) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        names_match && birthdate_match
    }
}

/// A person record: identity plus profile attributes that play no part in
/// kinship inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier
    pub id: PersonId,

    /// Identity fields used for matching
    pub identity: PersonIdentity,

    /// Tree this person belongs to, once placed in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<TreeId>,

    /// Optional deathdate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deathdate: Option<NaiveDate>,

    /// Optional place of birth
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_place: Option<String>,

    /// Nationalities, if recorded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nationality: Vec<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Person {
    /// Create a new person record from identity fields
    pub fn new(identity: PersonIdentity) -> Self {
        let now = Utc::now();
        Self {
            id: PersonId::new(),
            identity,
            tree: None,
            deathdate: None,
            birth_place: None,
            nationality: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn in_tree(mut self, tree: TreeId) -> Self {
        self.tree = Some(tree);
        self
    }

    pub fn with_deathdate(mut self, deathdate: NaiveDate) -> Self {
        self.deathdate = Some(deathdate);
        self
    }

    pub fn with_birth_place(mut self, place: impl Into<String>) -> Self {
        self.birth_place = Some(place.into());
        self
    }

    /// Display name, "First Last"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.identity.first_name, self.identity.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_person_creation() {
        let person = Person::new(PersonIdentity::new("Ada", "Lovelace"));

        assert_eq!(person.identity.first_name, "Ada");
        assert_eq!(person.identity.last_name, "Lovelace");
        assert!(person.identity.birthdate.is_none());
        assert!(person.tree.is_none());
        assert_eq!(person.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_same_person_requires_birthdate() {
        let a = PersonIdentity::new("Ada", "Lovelace");
        let b = PersonIdentity::new("Ada", "Lovelace");

        // Names alone are not enough
        assert!(!a.same_person(&b));

        let a = a.with_birthdate(date(1815, 12, 10));
        let b = b.with_birthdate(date(1815, 12, 10));
        assert!(a.same_person(&b));
    }

    #[test]
    fn test_same_person_is_case_insensitive() {
        let a = PersonIdentity::new("ada", "LOVELACE").with_birthdate(date(1815, 12, 10));
        let b = PersonIdentity::new(" Ada ", "Lovelace").with_birthdate(date(1815, 12, 10));
        assert!(a.same_person(&b));
    }

    #[test]
    fn test_same_person_birthdate_mismatch() {
        let a = PersonIdentity::new("Ada", "Lovelace").with_birthdate(date(1815, 12, 10));
        let b = PersonIdentity::new("Ada", "Lovelace").with_birthdate(date(1815, 12, 11));
        assert!(!a.same_person(&b));
    }
}
