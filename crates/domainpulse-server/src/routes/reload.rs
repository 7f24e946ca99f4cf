use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use domainpulse_core::dashboard::filter_options;

use crate::{error::AppError, state::AppState};

/// `POST /api/reload`: re-read the data source and swap the snapshot.
///
/// On failure the error is returned and the previous snapshot keeps serving.
#[tracing::instrument(skip(state))]
pub async fn reload(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let outcome = state.reload().await?;
    let store = state.snapshot().await;
    Ok(Json(json!({
        "status": "ok",
        "rows": outcome.rows,
        "dateRange": filter_options(&store).date_range,
        "dataVersion": outcome.data_version,
    })))
}
