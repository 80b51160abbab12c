use std::sync::Arc;

use crate::config::Config;
use crate::scoring::Scorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable scorer. Default: InProcessScorer. Swap via SCORER_BACKEND.
    pub scorer: Arc<dyn Scorer>,
}
