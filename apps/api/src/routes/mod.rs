pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::scoring::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Scan API
        .route("/api/v1/scan", post(handlers::handle_scan))
        .route("/api/v1/scan/report", post(handlers::handle_scan_report))
        // Path used by the editor front end
        .route("/api/scan-resume", post(handlers::handle_scan))
        .layer(body_limit)
        .with_state(state)
}
