//! Scoring Service — runs the full pipeline for one (candidate, target) pair.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::scoring::combiner::{BoostCurve, BoostTier, ScoreCombiner};
use crate::scoring::coverage::keyword_matches;
use crate::scoring::error::ScoreError;
use crate::scoring::similarity::cosine_similarity;
use crate::scoring::stopwords::StopWords;
use crate::scoring::tokenizer::Tokenizer;
use crate::scoring::vector::FrequencyVector;

/// Field names used in validation errors; they match the request body.
pub const CANDIDATE_FIELD: &str = "candidateText";
pub const TARGET_FIELD: &str = "targetText";

/// Full breakdown of one score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub score: f64,
    pub similarity: f64,
    pub coverage: f64,
    /// Weighted blend before the boost curve.
    pub blended: f64,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub candidate_tokens: usize,
    pub target_tokens: usize,
}

/// Pure, thread-safe scoring pipeline. The only shared state is the
/// read-only stop-word set inside the tokenizer.
#[derive(Debug, Clone)]
pub struct ScoringService {
    tokenizer: Tokenizer,
    combiner: ScoreCombiner,
}

impl ScoringService {
    pub fn new(tokenizer: Tokenizer, combiner: ScoreCombiner) -> Self {
        Self {
            tokenizer,
            combiner,
        }
    }

    /// Loads stop words (built-in or `STOP_WORDS_FILE`) and the configured curve.
    /// Fails when the curve does not pass `BoostCurve::new`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_tiers(config, config.score_curve.tiers())
    }

    fn with_tiers(config: &Config, tiers: &[BoostTier]) -> Result<Self> {
        let curve = BoostCurve::new(tiers.to_vec())
            .with_context(|| format!("Invalid boost curve {:?}", config.score_curve))?;
        let stop_words = match &config.stop_words_file {
            Some(path) => StopWords::load(path)?,
            None => StopWords::default(),
        };
        Ok(Self::new(Tokenizer::new(stop_words), ScoreCombiner::new(curve)))
    }

    /// Final score in [0, 98], rounded to one decimal place.
    pub fn score(&self, candidate: &str, target: &str) -> Result<f64, ScoreError> {
        self.report(candidate, target).map(|report| report.score)
    }

    pub fn report(&self, candidate: &str, target: &str) -> Result<ScoreReport, ScoreError> {
        validate_inputs(candidate, target)?;

        let candidate_tokens = self.tokenizer.tokenize(candidate);
        let target_tokens = self.tokenizer.tokenize(target);

        let candidate_vector = FrequencyVector::build(&candidate_tokens);
        let target_vector = FrequencyVector::build(&target_tokens);

        let similarity = cosine_similarity(&candidate_vector, &target_vector);
        let matches = keyword_matches(&candidate_tokens, &target_tokens);
        let coverage = matches.coverage();

        let blended = self.combiner.blend(similarity, coverage);
        let score = self.combiner.finish(blended)?;

        Ok(ScoreReport {
            score,
            similarity,
            coverage,
            blended,
            matched_keywords: matches.matched,
            missing_keywords: matches.missing,
            candidate_tokens: candidate_tokens.len(),
            target_tokens: target_tokens.len(),
        })
    }
}

/// Both texts must contain something other than whitespace.
pub fn validate_inputs(candidate: &str, target: &str) -> Result<(), ScoreError> {
    if candidate.trim().is_empty() {
        return Err(ScoreError::InvalidInput {
            field: CANDIDATE_FIELD,
        });
    }
    if target.trim().is_empty() {
        return Err(ScoreError::InvalidInput {
            field: TARGET_FIELD,
        });
    }
    Ok(())
}
