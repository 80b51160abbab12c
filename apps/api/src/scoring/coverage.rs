use std::collections::{BTreeSet, HashSet};

use crate::scoring::tokenizer::TokenSequence;

/// Distinct target keywords split by presence in the candidate, both sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordMatches {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

impl KeywordMatches {
    /// Percentage of distinct target keywords present in the candidate.
    /// Zero when the target had no keywords.
    pub fn coverage(&self) -> f64 {
        let total = self.matched.len() + self.missing.len();
        if total == 0 {
            return 0.0;
        }
        100.0 * self.matched.len() as f64 / total as f64
    }
}

/// Checks each distinct target token for presence in the candidate sequence.
/// Candidate multiplicity is irrelevant.
pub fn keyword_matches(candidate: &TokenSequence, target: &TokenSequence) -> KeywordMatches {
    let present: HashSet<&str> = candidate.iter().collect();
    let distinct: BTreeSet<&str> = target.iter().collect();

    let (matched, missing): (Vec<&str>, Vec<&str>) =
        distinct.into_iter().partition(|token| present.contains(token));

    KeywordMatches {
        matched: matched.into_iter().map(str::to_owned).collect(),
        missing: missing.into_iter().map(str::to_owned).collect(),
    }
}

/// Coverage of the target's distinct tokens by the candidate, in [0, 100].
pub fn coverage(candidate: &TokenSequence, target: &TokenSequence) -> f64 {
    keyword_matches(candidate, target).coverage()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(tokens: &[&str]) -> TokenSequence {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_full_coverage() {
        let candidate = seq(&["rust", "tokio", "axum"]);
        let target = seq(&["axum", "rust"]);
        assert_eq!(coverage(&candidate, &target), 100.0);
    }

    #[test]
    fn test_target_repeats_count_once() {
        let candidate = seq(&["rust"]);
        let target = seq(&["rust", "rust", "rust", "kafka"]);
        assert_eq!(coverage(&candidate, &target), 50.0);
    }

    #[test]
    fn test_candidate_multiplicity_is_irrelevant() {
        let target = seq(&["rust", "kafka"]);
        let once = coverage(&seq(&["rust"]), &target);
        let many = coverage(&seq(&["rust", "rust", "rust"]), &target);
        assert_eq!(once, many);
    }

    #[test]
    fn test_empty_target_is_zero() {
        let candidate = seq(&["rust"]);
        assert_eq!(coverage(&candidate, &TokenSequence::default()), 0.0);
    }

    #[test]
    fn test_empty_candidate_is_zero() {
        let target = seq(&["rust", "kafka"]);
        assert_eq!(coverage(&TokenSequence::default(), &target), 0.0);
    }

    #[test]
    fn test_keyword_matches_are_sorted_and_distinct() {
        let candidate = seq(&["node", "react", "typescript"]);
        let target = seq(&["react", "graphql", "node", "react", "docker"]);
        let matches = keyword_matches(&candidate, &target);
        assert_eq!(matches.matched, vec!["node", "react"]);
        assert_eq!(matches.missing, vec!["docker", "graphql"]);
        assert!((matches.coverage() - 50.0).abs() < f64::EPSILON);
    }
}
