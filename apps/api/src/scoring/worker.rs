//! Worker protocol — one JSON line in, one JSON line out.
//!
//! Parent → child: `{"candidateText": "...", "targetText": "..."}\n`, then stdin is closed.
//! Child → parent: `{"success":true,"score":..,"report":{..}}` or
//! `{"success":false,"error":".."}`, then the child exits 0.

use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::scoring::combiner::SCORE_CEILING;
use crate::scoring::error::ExternalProcessError;
use crate::scoring::service::{ScoreReport, ScoringService};

/// Longest slice of worker output kept in an error message.
const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRequest {
    #[serde(alias = "resumeText")]
    pub candidate_text: String,
    #[serde(alias = "jobDesc")]
    pub target_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ScoreReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkerReply {
    fn ok(report: ScoreReport) -> Self {
        Self {
            success: true,
            score: Some(report.score),
            report: Some(report),
            error: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            score: None,
            report: None,
            error: Some(message.into()),
        }
    }
}

/// Serializes a request as a single newline-terminated JSON line.
pub fn encode_request(candidate: &str, target: &str) -> Result<Vec<u8>, serde_json::Error> {
    let mut line = serde_json::to_vec(&WorkerRequest {
        candidate_text: candidate.to_string(),
        target_text: target.to_string(),
    })?;
    line.push(b'\n');
    Ok(line)
}

/// Parses the child's stdout. Anything other than a well-formed reply line is
/// malformed output; a well-formed failure reply is a worker error.
pub fn decode_reply(stdout: &[u8]) -> Result<ScoreReport, ExternalProcessError> {
    let text = std::str::from_utf8(stdout)
        .map_err(|_| ExternalProcessError::MalformedOutput("output is not UTF-8".to_string()))?;
    let line = first_line(text)
        .ok_or_else(|| ExternalProcessError::MalformedOutput("empty output".to_string()))?;

    let reply: WorkerReply = serde_json::from_str(line)
        .map_err(|e| ExternalProcessError::MalformedOutput(format!("{e}: {}", excerpt(line))))?;

    if !reply.success {
        return Err(ExternalProcessError::Worker(
            reply
                .error
                .unwrap_or_else(|| "no error message".to_string()),
        ));
    }

    let report = reply.report.ok_or_else(|| {
        ExternalProcessError::MalformedOutput("success reply without a report".to_string())
    })?;
    if !(0.0..=SCORE_CEILING).contains(&report.score) {
        return Err(ExternalProcessError::MalformedOutput(format!(
            "score {} out of range",
            report.score
        )));
    }
    if reply.score.is_some_and(|s| s != report.score) {
        return Err(ExternalProcessError::MalformedOutput(
            "score disagrees with report".to_string(),
        ));
    }
    Ok(report)
}

/// Scores one request line. Never fails: problems become a failure reply.
pub fn handle_line(service: &ScoringService, line: &str) -> WorkerReply {
    let request: WorkerRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => return WorkerReply::failed(format!("invalid request: {e}")),
    };
    match service.report(&request.candidate_text, &request.target_text) {
        Ok(report) => WorkerReply::ok(report),
        Err(e) => WorkerReply::failed(e.to_string()),
    }
}

/// Child side: reads stdin to completion, writes exactly one reply line.
pub async fn run_worker<R, W>(service: &ScoringService, mut input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = String::new();
    let reply = match input.read_to_string(&mut buffer).await {
        Ok(bytes) => {
            debug!(bytes, "Worker request received");
            match first_line(&buffer) {
                Some(line) => handle_line(service, line),
                None => WorkerReply::failed("no input data received"),
            }
        }
        Err(e) => {
            warn!("Worker failed to read request: {e}");
            if e.kind() == ErrorKind::InvalidData {
                WorkerReply::failed("request is not valid UTF-8")
            } else {
                WorkerReply::failed("failed to read request")
            }
        }
    };

    let mut line = serde_json::to_vec(&reply)?;
    line.push(b'\n');
    output.write_all(&line).await?;
    output.flush().await
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

pub(crate) fn excerpt(text: &str) -> String {
    let mut out: String = text.chars().take(EXCERPT_CHARS).collect();
    if text.chars().count() > EXCERPT_CHARS {
        out.push('…');
    }
    out
}
