use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use domainpulse_core::error::EngineError;

/// Application-level errors that map directly to HTTP responses.
///
/// Every variant implements [`IntoResponse`] so Axum handlers can use
/// `Result<impl IntoResponse, AppError>` as their return type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("reload failed: {0}")]
    ReloadFailed(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, Option<&'static str>) {
        match self {
            AppError::Engine(EngineError::InsufficientHistory { .. }) => {
                (StatusCode::BAD_REQUEST, "insufficient_history", Some("date"))
            }
            AppError::Engine(EngineError::UnknownMetric(_)) => {
                (StatusCode::BAD_REQUEST, "unknown_metric", Some("metric"))
            }
            AppError::Engine(EngineError::InvalidFilter(_)) => {
                (StatusCode::BAD_REQUEST, "validation_error", Some("topN"))
            }
            AppError::Engine(EngineError::InvalidDate(_)) => {
                (StatusCode::BAD_REQUEST, "validation_error", Some("date"))
            }
            AppError::Engine(EngineError::NoData) => {
                (StatusCode::SERVICE_UNAVAILABLE, "no_data", None)
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "validation_error", None),
            AppError::ReloadFailed(_) => (StatusCode::BAD_GATEWAY, "reload_failed", None),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, field) = self.parts();
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e}");
                "Internal server error".to_string()
            }
            AppError::ReloadFailed(msg) | AppError::BadRequest(msg) => msg.clone(),
            AppError::Engine(e) => e.to_string(),
        };

        (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                    "field": field
                }
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn status_and_code(err: AppError) -> (StatusCode, &'static str) {
        let (status, code, _) = err.parts();
        (status, code)
    }

    #[test]
    fn engine_errors_map_to_status_codes() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 1).expect("date");
        assert_eq!(
            status_and_code(
                EngineError::InsufficientHistory {
                    anchor: d,
                    min_anchor: d,
                    max_anchor: d,
                }
                .into()
            ),
            (StatusCode::BAD_REQUEST, "insufficient_history")
        );
        assert_eq!(
            status_and_code(EngineError::UnknownMetric("Revenue".into()).into()),
            (StatusCode::BAD_REQUEST, "unknown_metric")
        );
        assert_eq!(
            status_and_code(EngineError::InvalidFilter("topN".into()).into()),
            (StatusCode::BAD_REQUEST, "validation_error")
        );
        assert_eq!(
            status_and_code(EngineError::NoData.into()),
            (StatusCode::SERVICE_UNAVAILABLE, "no_data")
        );
        assert_eq!(
            status_and_code(AppError::ReloadFailed("boom".into())),
            (StatusCode::BAD_GATEWAY, "reload_failed")
        );
    }
}
