//! Containment matcher - case-insensitive name containment

use async_trait::async_trait;

use crate::traits::{IdentityMatcher, Result};
use kindred_core::{Person, PersonIdentity};

/// Case-insensitive containment matcher (stateless).
///
/// A stored person is a candidate when its first and last names each contain
/// the probe's trimmed name, compared lowercased. Exact equality is the
/// degenerate case. Optionally the probe's birthdate, when present, must
/// match exactly as well.
pub struct ContainmentMatcher {
    require_birthdate: bool,
}

impl ContainmentMatcher {
    pub fn new() -> Self {
        Self {
            require_birthdate: false,
        }
    }

    /// Also require an exact birthdate match whenever the probe carries one
    pub fn with_birthdate(mut self) -> Self {
        self.require_birthdate = true;
        self
    }

    fn matches(&self, probe: &PersonIdentity, person: &Person) -> bool {
        let identity = &person.identity;
        let first_matches = identity
            .normalized_first()
            .contains(&probe.normalized_first());
        let last_matches = identity.normalized_last().contains(&probe.normalized_last());
        if !first_matches || !last_matches {
            return false;
        }

        if self.require_birthdate {
            if let Some(probe_birthdate) = probe.birthdate {
                return identity.birthdate == Some(probe_birthdate);
            }
        }

        true
    }
}

impl Default for ContainmentMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityMatcher for ContainmentMatcher {
    async fn candidates(
        &self,
        probe: &PersonIdentity,
        persons: &[Person],
    ) -> Result<Vec<Person>> {
        Ok(persons
            .iter()
            .filter(|p| self.matches(probe, p))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn person(first: &str, last: &str) -> Person {
        Person::new(PersonIdentity::new(first, last))
    }

    #[tokio::test]
    async fn test_containment_is_case_insensitive() {
        let matcher = ContainmentMatcher::new();
        let persons = vec![person("Johannes", "Brahms"), person("Clara", "Schumann")];

        let probe = PersonIdentity::new("johannes", "brahms");
        let results = matcher.candidates(&probe, &persons).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].identity.first_name, "Johannes");
    }

    #[tokio::test]
    async fn test_probe_may_be_a_substring() {
        let matcher = ContainmentMatcher::new();
        let persons = vec![person("Johannes", "Brahms")];

        let probe = PersonIdentity::new("Johan", "Brahms");
        let results = matcher.candidates(&probe, &persons).await.unwrap();
        assert_eq!(results.len(), 1);

        // But not the other way around
        let probe = PersonIdentity::new("Johanneses", "Brahms");
        let results = matcher.candidates(&probe, &persons).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_birthdate_narrowing() {
        let date = NaiveDate::from_ymd_opt(1833, 5, 7).unwrap();
        let mut with_date = person("Johannes", "Brahms");
        with_date.identity.birthdate = Some(date);
        let without_date = person("Johannes", "Brahms");
        let persons = vec![with_date.clone(), without_date];

        let probe = PersonIdentity::new("Johannes", "Brahms").with_birthdate(date);

        let loose = ContainmentMatcher::new();
        assert_eq!(loose.candidates(&probe, &persons).await.unwrap().len(), 2);

        let strict = ContainmentMatcher::new().with_birthdate();
        let results = strict.candidates(&probe, &persons).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, with_date.id);
    }
}
