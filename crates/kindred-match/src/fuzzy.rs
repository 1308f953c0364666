//! Fuzzy identity matching using nucleo

use async_trait::async_trait;
use nucleo_matcher::{
    pattern::{AtomKind, CaseMatching, Normalization, Pattern},
    Config, Matcher,
};

use crate::traits::{IdentityMatcher, Result};
use kindred_core::{Person, PersonIdentity};

/// Stateless fuzzy identity matcher using nucleo.
///
/// Widens the candidate pool past strict containment: typos and transposed
/// characters in either name still score. Candidates are returned best-first.
pub struct FuzzyMatcher {
    pub min_score: u32,
}

impl FuzzyMatcher {
    pub fn new() -> Self {
        Self { min_score: 50 }
    }

    pub fn with_min_score(mut self, min_score: u32) -> Self {
        self.min_score = min_score;
        self
    }

    fn searchable(person: &Person) -> String {
        format!(
            "{} {}",
            person.identity.first_name.trim(),
            person.identity.last_name.trim()
        )
    }

    fn score(person: &Person, probe: &PersonIdentity, matcher: &mut Matcher) -> Option<u32> {
        let pattern = Pattern::new(
            &format!("{} {}", probe.first_name.trim(), probe.last_name.trim()),
            CaseMatching::Ignore,
            Normalization::Smart,
            AtomKind::Fuzzy,
        );

        let searchable = Self::searchable(person);
        let mut buf = Vec::new();
        pattern.score(nucleo_matcher::Utf32Str::new(&searchable, &mut buf), matcher)
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityMatcher for FuzzyMatcher {
    async fn candidates(
        &self,
        probe: &PersonIdentity,
        persons: &[Person],
    ) -> Result<Vec<Person>> {
        let mut matcher = Matcher::new(Config::DEFAULT);

        let mut scored: Vec<(Person, u32)> = persons
            .iter()
            .filter_map(|p| {
                Self::score(p, probe, &mut matcher)
                    .filter(|score| *score >= self.min_score)
                    .map(|score| (p.clone(), score))
            })
            .collect();

        // Best first
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(scored.into_iter().map(|(p, _)| p).collect())
    }
}
