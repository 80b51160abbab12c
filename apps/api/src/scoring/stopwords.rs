//! Stop words: tokens dropped before scoring because they say nothing about fit.
//!
//! The set is built once at start-up and shared read-only. There are no
//! mutators; a different list is a configuration change (`STOP_WORDS_FILE`).

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

/// Built-in list: English function words plus generic job-posting filler.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    // Function words
    "a", "about", "above", "across", "after", "again", "against", "all", "also", "am", "an",
    "and", "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down",
    "during", "each", "etc", "few", "for", "from", "further", "had", "has", "have", "having",
    "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "if", "in", "into",
    "is", "it", "its", "itself", "just", "may", "me", "more", "most", "must", "my", "no", "nor",
    "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves",
    "out", "over", "own", "per", "same", "she", "should", "so", "some", "such", "than", "that",
    "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "under", "until", "up", "us", "very", "via", "was", "we",
    "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with",
    "within", "would", "you", "your", "yours", "yourself", "yourselves",
    // Job-posting filler
    "ability", "candidate", "candidates", "company", "experience", "experienced", "ideal",
    "including", "join", "looking", "opportunity", "plus", "position", "preferred", "required",
    "requirements", "responsibilities", "responsibility", "responsible", "role", "seeking",
    "team", "teams", "work", "working", "year", "years",
];

/// Frozen, case-normalized stop-word set. Cloning shares the same set.
#[derive(Debug, Clone)]
pub struct StopWords {
    words: Arc<HashSet<String>>,
}

impl StopWords {
    /// Builds a set from arbitrary words, lowercasing and trimming each one.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            words: Arc::new(words),
        }
    }

    /// Reads one word per line. Blank lines and lines starting with `#` are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stop words from {}", path.display()))?;
        Ok(Self::parse(&contents))
    }

    fn parse(contents: &str) -> Self {
        Self::from_words(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Exact match against an already-normalized token.
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::from_words(DEFAULT_STOP_WORDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_contains_function_words_and_filler() {
        let stop = StopWords::default();
        for word in ["the", "and", "with", "team", "experience", "responsible"] {
            assert!(stop.contains(word), "missing {word}");
        }
    }

    #[test]
    fn test_default_keeps_skill_words() {
        let stop = StopWords::default();
        for word in ["rust", "react", "node", "kubernetes", "engineering", "skills", "abc"] {
            assert!(!stop.contains(word), "{word} should not be a stop word");
        }
    }

    #[test]
    fn test_from_words_normalizes_case_and_whitespace() {
        let stop = StopWords::from_words(["  Team ", "EXPERIENCE", ""]);
        assert_eq!(stop.len(), 2);
        assert!(stop.contains("team"));
        assert!(stop.contains("experience"));
        assert!(!stop.contains("Team"));
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let stop = StopWords::parse("# filler\nsynergy\n\n  leverage  \n#ignored\n");
        assert_eq!(stop.len(), 2);
        assert!(stop.contains("synergy"));
        assert!(stop.contains("leverage"));
    }

    #[test]
    fn test_load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha\nbeta").unwrap();
        let stop = StopWords::load(file.path()).unwrap();
        assert!(stop.contains("alpha"));
        assert!(stop.contains("beta"));
        assert!(!stop.contains("the"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = StopWords::load(Path::new("/nonexistent/stop-words.txt")).unwrap_err();
        assert!(err.to_string().contains("Failed to read stop words"));
    }

    #[test]
    fn test_clones_share_the_same_set() {
        let a = StopWords::default();
        let b = a.clone();
        assert!(Arc::ptr_eq(&a.words, &b.words));
    }
}
