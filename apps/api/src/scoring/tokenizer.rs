//! Tokenizer — turns raw text into the significant tokens used for scoring.
//!
//! Pipeline: lowercase → non-word characters become spaces → split on
//! whitespace → drop tokens of 2 characters or fewer → drop stop words.

use crate::scoring::stopwords::StopWords;

/// Tokens shorter than or equal to this many characters are ignored.
pub const MIN_TOKEN_CHARS: usize = 2;

/// Ordered, possibly repeating sequence of significant tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSequence(Vec<String>);

impl TokenSequence {
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for TokenSequence {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Lowercases `text` and replaces every character that is neither a word
/// character (alphanumeric or `_`) nor whitespace with a single space.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if is_word_char(c) || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Stateless apart from the injected, read-only stop-word set.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stop_words: StopWords,
}

impl Tokenizer {
    pub fn new(stop_words: StopWords) -> Self {
        Self { stop_words }
    }

    pub fn tokenize(&self, text: &str) -> TokenSequence {
        normalize(text)
            .split_whitespace()
            .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
            .filter(|token| !self.stop_words.contains(token))
            .map(str::to_owned)
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(StopWords::default())
    }
}
