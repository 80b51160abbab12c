use std::collections::HashMap;

use crate::scoring::tokenizer::TokenSequence;

/// Bag-of-words view of one token sequence: token → occurrence count.
///
/// Keys are exactly the distinct tokens of the source sequence and every
/// count is at least 1. Iteration order is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyVector<'a> {
    counts: HashMap<&'a str, u32>,
}

impl<'a> FrequencyVector<'a> {
    pub fn build(tokens: &'a TokenSequence) -> Self {
        let mut counts = HashMap::with_capacity(tokens.len());
        for token in tokens.iter() {
            *counts.entry(token).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn get(&self, token: &str) -> Option<u32> {
        self.counts.get(token).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, u32)> + '_ {
        self.counts.iter().map(|(&token, &count)| (token, count))
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Euclidean norm of the count vector.
    pub fn magnitude(&self) -> f64 {
        self.counts
            .values()
            .map(|&c| f64::from(c) * f64::from(c))
            .sum::<f64>()
            .sqrt()
    }
}
