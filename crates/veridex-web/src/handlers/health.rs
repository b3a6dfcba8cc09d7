//! Liveness probe and the unknown-route fallback.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::SharedState;

/// Informational only — not part of the analysis contract. Reports the
/// credential check done at startup so a misconfigured key shows up here
/// instead of on the first analysis request.
pub async fn health(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "Veridex news analysis API",
        "environment": state.environment,
        "api_key_configured": state.api_key_configured,
    }))
}

pub async fn unknown_route() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "status": "error", "message": "Route not found" })),
    )
}
