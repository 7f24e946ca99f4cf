use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};

use domainpulse_core::{dashboard::DashboardRequest, projection::render_csv};

use crate::{
    error::AppError,
    routes::dashboard::{compute, request_body},
    state::AppState,
};

/// `POST /api/export`: the significant-decline cohort as a CSV download.
///
/// Takes the same body as `/api/dashboard-data`, so the rows follow the
/// table's current sort. An empty cohort yields just the header line.
#[tracing::instrument(skip(state, body))]
pub async fn export_declines(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DashboardRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = request_body(body)?;
    let dashboard = compute(&state, &req).await?;
    let metric = dashboard.filters.metric;
    let csv_bytes = render_csv(&dashboard.export_rows(), metric)?;
    let filename = format!(
        "domain-decline-{}-{}.csv",
        metric.as_str().to_lowercase(),
        dashboard.filters.date
    );
    build_csv_response(&filename, csv_bytes)
}

fn build_csv_response(filename: &str, csv_bytes: Vec<u8>) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(axum::body::Body::from(csv_bytes))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("response build failed: {e}")))
}
