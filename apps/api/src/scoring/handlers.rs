//! Axum route handlers for the Scan API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::scoring::service::{ScoreReport, CANDIDATE_FIELD, TARGET_FIELD};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Both fields are optional at the serde level so a missing field is reported
/// by name instead of as a generic JSON rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    #[serde(default, alias = "resumeText")]
    pub candidate_text: Option<String>,
    #[serde(default, alias = "jobDesc")]
    pub target_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub success: bool,
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct ScanReportResponse {
    pub success: bool,
    pub score: f64,
    pub report: ScoreReport,
}

impl ScanRequest {
    fn into_texts(self) -> Result<(String, String), AppError> {
        let candidate = require(self.candidate_text, CANDIDATE_FIELD)?;
        let target = require(self.target_text, TARGET_FIELD)?;
        Ok((candidate, target))
    }
}

fn require(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        Some(_) => Err(AppError::Validation(format!("{field} cannot be empty"))),
        None => Err(AppError::Validation(format!("{field} is required"))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/scan (also mounted at /api/scan-resume)
///
/// Scores a plain-text resume against a plain-text job description.
pub async fn handle_scan(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanResponse>, AppError> {
    let report = run_scan(&state, payload?.0).await?;
    Ok(Json(ScanResponse {
        success: true,
        score: report.score,
    }))
}

/// POST /api/v1/scan/report
///
/// Same as `/scan`, plus the similarity/coverage breakdown and keyword gaps.
pub async fn handle_scan_report(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanReportResponse>, AppError> {
    let report = run_scan(&state, payload?.0).await?;
    Ok(Json(ScanReportResponse {
        success: true,
        score: report.score,
        report,
    }))
}

async fn run_scan(state: &AppState, request: ScanRequest) -> Result<ScoreReport, AppError> {
    let request_id = Uuid::new_v4();
    let span = info_span!(
        "scan",
        %request_id,
        backend = state.scorer.backend().as_str()
    );

    async move {
        let outcome = score_request(state, request).await;
        match &outcome {
            Ok(report) => info!(
                candidate_tokens = report.candidate_tokens,
                target_tokens = report.target_tokens,
                score = report.score,
                "Scan complete"
            ),
            Err(e) => warn!(error = %e, "Scan failed"),
        }
        outcome
    }
    .instrument(span)
    .await
}

async fn score_request(state: &AppState, request: ScanRequest) -> Result<ScoreReport, AppError> {
    let (candidate, target) = request.into_texts()?;
    Ok(state.scorer.score(&candidate, &target).await?)
}
