use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// `GET /health` and `GET /api/health`: liveness check.
///
/// Returns `200 OK` while a snapshot with rows is being served and
/// `503 Service Unavailable` when nothing is loaded (the initial load failed
/// and no reload has succeeded since).
///
/// Response shape:
/// ```json
/// { "status": "ok", "service": "domainpulse", "version": "0.1.0",
///   "rows": 1234, "dataVersion": "9f2c...", "loadedAt": "..." }
/// ```
#[tracing::instrument(skip(state))]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = state.snapshot().await;
    let (status, label) = if store.is_empty() {
        tracing::warn!("Health check: no data loaded");
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    } else {
        (StatusCode::OK, "ok")
    };

    (
        status,
        Json(json!({
            "status": label,
            "service": "domainpulse",
            "version": env!("CARGO_PKG_VERSION"),
            "rows": store.len(),
            "dataVersion": store.fingerprint(),
            "loadedAt": store.loaded_at(),
        })),
    )
}
