use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};

use domainpulse_core::dashboard::{run_dashboard, DashboardRequest, DashboardResponse};

use crate::{error::AppError, state::AppState};

/// Unwrap a JSON body, reporting malformed input as a validation error.
pub(crate) fn request_body(
    body: Result<Json<DashboardRequest>, JsonRejection>,
) -> Result<DashboardRequest, AppError> {
    body.map(|Json(req)| req)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Run the comparison on the current snapshot. Shared with the export route.
pub(crate) async fn compute(
    state: &AppState,
    req: &DashboardRequest,
) -> Result<DashboardResponse, AppError> {
    let store = state.snapshot().await;
    let response = run_dashboard(&store, req, &state.config.engine)?;
    tracing::debug!(
        domains = response.domain_data.len(),
        declines = response.decline_cohort.len(),
        "Dashboard computed"
    );
    Ok(response)
}

/// `POST /api/dashboard-data`: week-over-week comparison for the filters in
/// the body.
#[tracing::instrument(skip(state, body))]
pub async fn dashboard_data(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DashboardRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = request_body(body)?;
    Ok(Json(compute(&state, &req).await?))
}
