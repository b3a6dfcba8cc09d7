//! Shared application state for the web server.

use std::sync::Arc;

use veridex_llm::service::AnalysisService;

/// Shared state injected into every Axum handler. The service itself is
/// stateless, so concurrent requests never contend.
pub struct AppState {
    pub service: AnalysisService,
    pub environment: String,
    /// Checked once at startup; surfaced by the health endpoint so a
    /// missing credential is visible before the first analysis request.
    pub api_key_configured: bool,
}

pub type SharedState = Arc<AppState>;
