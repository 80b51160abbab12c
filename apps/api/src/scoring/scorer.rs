//! Scorer — pluggable backend that turns a (candidate, target) pair into a report.
//!
//! Default: `InProcessScorer` (pure Rust, synchronous, no I/O).
//! Alternative: `ProcessScorer` (one `ats-scan worker` child per request).
//!
//! `AppState` holds an `Arc<dyn Scorer>` chosen once at startup by
//! `scorer_from_config`.

use std::io::ErrorKind;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::config::{Config, ScorerBackend, WorkerConfig};
use crate::scoring::error::{ExternalProcessError, ScoreError};
use crate::scoring::service::{validate_inputs, ScoreReport, ScoringService};
use crate::scoring::worker::{decode_reply, encode_request, excerpt};

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap scoring backends without touching handlers.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, candidate: &str, target: &str) -> Result<ScoreReport, ScoreError>;

    fn backend(&self) -> ScorerBackend;
}

/// Picks the backend named in config.
pub fn scorer_from_config(config: &Config, service: ScoringService) -> Arc<dyn Scorer> {
    match config.scorer_backend {
        ScorerBackend::InProcess => Arc::new(InProcessScorer::new(service)),
        ScorerBackend::Process => Arc::new(ProcessScorer::new(config.worker.clone())),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// InProcessScorer
// ────────────────────────────────────────────────────────────────────────────

/// Runs the pipeline on the calling task. O(input length), no cancellation.
pub struct InProcessScorer {
    service: ScoringService,
}

impl InProcessScorer {
    pub fn new(service: ScoringService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Scorer for InProcessScorer {
    async fn score(&self, candidate: &str, target: &str) -> Result<ScoreReport, ScoreError> {
        self.service.report(candidate, target)
    }

    fn backend(&self) -> ScorerBackend {
        ScorerBackend::InProcess
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ProcessScorer
// ────────────────────────────────────────────────────────────────────────────

/// Delegates each request to a short-lived child process.
///
/// Lifecycle per request: spawn (one retry on spawn failure when enabled),
/// write the request line, close stdin, read stdout/stderr to completion,
/// reap. The whole exchange is bounded by `WorkerConfig::timeout`; on expiry
/// the child is killed.
pub struct ProcessScorer {
    config: WorkerConfig,
}

impl ProcessScorer {
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    fn spawn(&self) -> Result<Child, ExternalProcessError> {
        let max_attempts = if self.config.spawn_retry { 2 } else { 1 };
        let mut attempt = 1;
        loop {
            match self.command().spawn() {
                Ok(child) => return Ok(child),
                Err(e) if attempt < max_attempts => {
                    warn!(
                        program = %self.config.program.display(),
                        attempt,
                        "Failed to spawn scoring worker ({e}), retrying once"
                    );
                    attempt += 1;
                }
                Err(source) => {
                    return Err(ExternalProcessError::Spawn {
                        attempts: attempt,
                        source,
                    })
                }
            }
        }
    }

    async fn exchange(&self, payload: Vec<u8>) -> Result<ScoreReport, ExternalProcessError> {
        let mut child = self.spawn()?;
        let mut stdin = child.stdin.take().ok_or_else(|| {
            ExternalProcessError::Io(std::io::Error::new(
                ErrorKind::BrokenPipe,
                "worker stdin was not captured",
            ))
        })?;

        let run = async move {
            // A worker that exits without reading still gets judged by its
            // exit status and output below.
            if let Err(e) = stdin.write_all(&payload).await {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(e);
                }
            }
            drop(stdin);
            child.wait_with_output().await
        };

        let output = match tokio::time::timeout(self.config.timeout, run).await {
            Ok(result) => result?,
            Err(_) => return Err(ExternalProcessError::Timeout(self.config.timeout)),
        };

        if !output.status.success() {
            return Err(ExternalProcessError::ExitStatus {
                status: output.status.to_string(),
                stderr: excerpt(String::from_utf8_lossy(&output.stderr).trim()),
            });
        }

        if !output.stderr.is_empty() {
            debug!(
                stderr = %excerpt(String::from_utf8_lossy(&output.stderr).trim()),
                "Scoring worker wrote to stderr"
            );
        }

        decode_reply(&output.stdout)
    }
}

#[async_trait]
impl Scorer for ProcessScorer {
    async fn score(&self, candidate: &str, target: &str) -> Result<ScoreReport, ScoreError> {
        validate_inputs(candidate, target)?;
        let payload = encode_request(candidate, target)
            .map_err(|e| ScoreError::Computation(format!("failed to encode worker request: {e}")))?;
        Ok(self.exchange(payload).await?)
    }

    fn backend(&self) -> ScorerBackend {
        ScorerBackend::Process
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn default_service() -> ScoringService {
        ScoringService::from_config(&Config::default()).unwrap()
    }

    fn shell_worker(script: &str, timeout_ms: u64) -> ProcessScorer {
        ProcessScorer::new(WorkerConfig {
            program: PathBuf::from("sh"),
            args: vec!["-c".to_string(), script.to_string()],
            timeout: Duration::from_millis(timeout_ms),
            spawn_retry: true,
        })
    }

    #[tokio::test]
    async fn test_in_process_scorer_matches_service() {
        let service = default_service();
        let expected = service.report("abc", "abc").unwrap();
        let scorer = InProcessScorer::new(service);
        assert_eq!(scorer.score("abc", "abc").await.unwrap(), expected);
        assert_eq!(scorer.backend(), ScorerBackend::InProcess);
    }

    #[test]
    fn test_factory_honors_backend() {
        let mut config = Config::default();
        let scorer = scorer_from_config(&config, default_service());
        assert_eq!(scorer.backend(), ScorerBackend::InProcess);

        config.scorer_backend = ScorerBackend::Process;
        let scorer = scorer_from_config(&config, default_service());
        assert_eq!(scorer.backend(), ScorerBackend::Process);
    }

    #[tokio::test]
    async fn test_process_scorer_validates_before_spawning() {
        // The program does not exist, so reaching spawn would be a Spawn error.
        let scorer = ProcessScorer::new(WorkerConfig {
            program: PathBuf::from("/nonexistent/ats-scan-worker"),
            ..WorkerConfig::default()
        });
        assert!(matches!(
            scorer.score(" ", "rust").await,
            Err(ScoreError::InvalidInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_retried_once() {
        let scorer = ProcessScorer::new(WorkerConfig {
            program: PathBuf::from("/nonexistent/ats-scan-worker"),
            ..WorkerConfig::default()
        });
        match scorer.score("rust", "rust").await {
            Err(ScoreError::ExternalProcess(ExternalProcessError::Spawn { attempts, .. })) => {
                assert_eq!(attempts, 2)
            }
            other => panic!("expected spawn error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_spawn_failure_without_retry() {
        let scorer = ProcessScorer::new(WorkerConfig {
            program: PathBuf::from("/nonexistent/ats-scan-worker"),
            spawn_retry: false,
            ..WorkerConfig::default()
        });
        match scorer.score("rust", "rust").await {
            Err(ScoreError::ExternalProcess(ExternalProcessError::Spawn { attempts, .. })) => {
                assert_eq!(attempts, 1)
            }
            other => panic!("expected spawn error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_exit_status_error() {
        let scorer = shell_worker("cat > /dev/null; echo 'worker blew up' >&2; exit 3", 5_000);
        match scorer.score("rust", "rust").await {
            Err(ScoreError::ExternalProcess(ExternalProcessError::ExitStatus { status, stderr })) => {
                assert!(status.contains('3'), "status was {status}");
                assert_eq!(stderr, "worker blew up");
            }
            other => panic!("expected exit status error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_without_reading_stdin_is_exit_status_error() {
        let scorer = shell_worker("exit 7", 5_000);
        assert!(matches!(
            scorer.score("rust", "rust").await,
            Err(ScoreError::ExternalProcess(
                ExternalProcessError::ExitStatus { .. }
            ))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_garbage_output_is_malformed() {
        let scorer = shell_worker("cat > /dev/null; echo 'score: high'", 5_000);
        assert!(matches!(
            scorer.score("rust", "rust").await,
            Err(ScoreError::ExternalProcess(
                ExternalProcessError::MalformedOutput(_)
            ))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_reply_is_worker_error() {
        let scorer = shell_worker(
            r#"cat > /dev/null; echo '{"success":false,"error":"model missing"}'"#,
            5_000,
        );
        match scorer.score("rust", "rust").await {
            Err(ScoreError::ExternalProcess(ExternalProcessError::Worker(msg))) => {
                assert_eq!(msg, "model missing")
            }
            other => panic!("expected worker error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_worker_times_out() {
        let scorer = shell_worker("sleep 5", 200);
        let started = std::time::Instant::now();
        assert!(matches!(
            scorer.score("rust", "rust").await,
            Err(ScoreError::ExternalProcess(ExternalProcessError::Timeout(_)))
        ));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_worker_receives_one_request_line() {
        // Echo back a canned reply only if exactly one line arrived.
        let script = r#"n=$(wc -l); if [ "$n" -eq 1 ]; then echo '{"success":true,"score":12.5,"report":{"score":12.5,"similarity":0.0,"coverage":0.0,"blended":12.5,"matched_keywords":[],"missing_keywords":[],"candidate_tokens":0,"target_tokens":0}}'; else exit 9; fi"#;
        let scorer = shell_worker(script, 5_000);
        let report = scorer
            .score("multi\nline\nresume", "multi\nline\njob")
            .await
            .unwrap();
        assert_eq!(report.score, 12.5);
    }
}
