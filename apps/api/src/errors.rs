use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::scoring::{ExternalProcessError, ScoreError};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Scoring worker error: {0}")]
    ExternalProcess(#[from] ExternalProcessError),
}

impl From<ScoreError> for AppError {
    fn from(err: ScoreError) -> Self {
        match err {
            ScoreError::InvalidInput { .. } => AppError::Validation(err.to_string()),
            ScoreError::Computation(msg) => AppError::Computation(msg),
            ScoreError::ExternalProcess(e) => AppError::ExternalProcess(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::Validation(rejection.body_text())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
            ),
            AppError::Computation(msg) => {
                tracing::error!("Computation error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "COMPUTATION_ERROR",
                    "The score could not be computed".to_string(),
                )
            }
            AppError::ExternalProcess(e @ ExternalProcessError::Timeout(_)) => {
                tracing::error!("Scoring worker error: {e}");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "SCORER_TIMEOUT",
                    "The scoring worker did not respond in time".to_string(),
                )
            }
            AppError::ExternalProcess(e) => {
                tracing::error!("Scoring worker error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SCORER_PROCESS_ERROR",
                    "Analysis failed".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::time::Duration;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_invalid_input_maps_to_400_naming_field() {
        let err: AppError = ScoreError::InvalidInput {
            field: "targetText",
        }
        .into();
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("targetText"));
    }

    #[tokio::test]
    async fn test_computation_error_hides_detail() {
        let err: AppError = ScoreError::Computation("blended score is not finite: NaN".into()).into();
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "COMPUTATION_ERROR");
        assert!(!body.to_string().contains("NaN"));
    }

    #[tokio::test]
    async fn test_worker_failure_hides_diagnostic() {
        let err: AppError = ScoreError::from(ExternalProcessError::ExitStatus {
            status: "exit status: 1".into(),
            stderr: "Traceback (most recent call last): secret.py line 3".into(),
        })
        .into();
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "SCORER_PROCESS_ERROR");
        assert_eq!(body["error"]["message"], "Analysis failed");
        assert!(!body.to_string().contains("Traceback"));
    }

    #[tokio::test]
    async fn test_worker_timeout_maps_to_504() {
        let err = AppError::ExternalProcess(ExternalProcessError::Timeout(Duration::from_secs(5)));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"]["code"], "SCORER_TIMEOUT");
    }
}
