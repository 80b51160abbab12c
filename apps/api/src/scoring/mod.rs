// Scoring engine: tokenization, bag-of-words similarity, keyword coverage,
// boosted blend. Everything below `service` is pure and synchronous; `scorer`
// adds the pluggable in-process / worker-process backends.

pub mod combiner;
pub mod coverage;
pub mod error;
pub mod handlers;
pub mod scorer;
pub mod service;
pub mod similarity;
pub mod stopwords;
pub mod tokenizer;
pub mod vector;
pub mod worker;

pub use error::{ExternalProcessError, ScoreError};
pub use scorer::{scorer_from_config, Scorer};
pub use service::{ScoreReport, ScoringService};
