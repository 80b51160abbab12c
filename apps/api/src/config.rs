use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};

use crate::scoring::combiner::CurveVersion;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WORKER_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
const WORKER_SUBCOMMAND: &str = "worker";

/// Which `Scorer` implementation serves requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScorerBackend {
    #[default]
    InProcess,
    Process,
}

impl ScorerBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            ScorerBackend::InProcess => "in_process",
            ScorerBackend::Process => "process",
        }
    }
}

impl FromStr for ScorerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in_process" | "in-process" | "inprocess" => Ok(ScorerBackend::InProcess),
            "process" => Ok(ScorerBackend::Process),
            other => bail!("unknown scorer backend '{other}' (expected in_process or process)"),
        }
    }
}

/// How to launch and supervise the out-of-process scoring worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub timeout: Duration,
    /// Retry a failed spawn once.
    pub spawn_retry: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(env!("CARGO_PKG_NAME")),
            args: vec![WORKER_SUBCOMMAND.to_string()],
            timeout: Duration::from_millis(DEFAULT_WORKER_TIMEOUT_MS),
            spawn_retry: true,
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable is optional; invalid values fail start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub scorer_backend: ScorerBackend,
    pub worker: WorkerConfig,
    pub score_curve: CurveVersion,
    pub stop_words_file: Option<PathBuf>,
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            rust_log: "info".to_string(),
            scorer_backend: ScorerBackend::default(),
            worker: WorkerConfig::default(),
            score_curve: CurveVersion::default(),
            stop_words_file: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let timeout_ms: u64 =
            parse_or("SCORER_WORKER_TIMEOUT_MS", &lookup, DEFAULT_WORKER_TIMEOUT_MS)?;
        if timeout_ms == 0 {
            bail!("SCORER_WORKER_TIMEOUT_MS must be greater than zero");
        }

        let worker = WorkerConfig {
            timeout: Duration::from_millis(timeout_ms),
            spawn_retry: parse_bool_or("SCORER_WORKER_SPAWN_RETRY", &lookup, true)?,
            ..worker_command(&lookup)?
        };

        Ok(Config {
            port: parse_or("PORT", &lookup, defaults.port)
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            scorer_backend: parse_or("SCORER_BACKEND", &lookup, defaults.scorer_backend)?,
            worker,
            score_curve: parse_or("SCORE_CURVE", &lookup, defaults.score_curve)?,
            stop_words_file: lookup("STOP_WORDS_FILE")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            max_body_bytes: parse_or("MAX_BODY_BYTES", &lookup, defaults.max_body_bytes)?,
        })
    }
}

/// `SCORER_WORKER_CMD` is whitespace separated: program, then args. Without it
/// the worker is this same executable run with the `worker` subcommand.
fn worker_command<F>(lookup: &F) -> Result<WorkerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("SCORER_WORKER_CMD") {
        Some(cmd) => {
            let mut parts = cmd.split_whitespace().map(str::to_string);
            let program = parts
                .next()
                .context("SCORER_WORKER_CMD must name a program")?;
            Ok(WorkerConfig {
                program: PathBuf::from(program),
                args: parts.collect(),
                ..WorkerConfig::default()
            })
        }
        None => Ok(WorkerConfig {
            program: std::env::current_exe()
                .context("Failed to resolve current executable for the scoring worker")?,
            ..WorkerConfig::default()
        }),
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("Invalid value '{raw}' for {key}: {e}")),
        None => Ok(default),
    }
}

fn parse_bool_or<F>(key: &str, lookup: &F, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => bail!("Invalid value '{v}' for {key}: expected true or false"),
        None => Ok(default),
    }
}
