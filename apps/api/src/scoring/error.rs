use std::time::Duration;

use thiserror::Error;

/// Errors produced while scoring a single (candidate, target) pair.
///
/// Every error is local to one request; nothing here is retried except a
/// failed worker spawn (see `ProcessScorer`).
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("{field} is required and cannot be empty")]
    InvalidInput { field: &'static str },

    #[error("Score computation failed: {0}")]
    Computation(String),

    #[error(transparent)]
    ExternalProcess(#[from] ExternalProcessError),
}

/// Failures of the out-of-process scorer. The raw diagnostic is carried here
/// for logging and must not be returned to HTTP callers verbatim.
#[derive(Debug, Error)]
pub enum ExternalProcessError {
    #[error("failed to spawn scoring worker after {attempts} attempt(s): {source}")]
    Spawn {
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("scoring worker I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("scoring worker timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("scoring worker exited with {status}: {stderr}")]
    ExitStatus { status: String, stderr: String },

    #[error("scoring worker returned malformed output: {0}")]
    MalformedOutput(String),

    #[error("scoring worker reported failure: {0}")]
    Worker(String),
}
