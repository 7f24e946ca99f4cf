use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned by the comparison engine.
///
/// Every variant is a request-level validation failure: the engine either
/// produces a complete payload or one of these, never a partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(
        "insufficient history for {anchor}: anchor date must be between {min_anchor} and {max_anchor}"
    )]
    InsufficientHistory {
        anchor: NaiveDate,
        min_anchor: NaiveDate,
        max_anchor: NaiveDate,
    },

    #[error("unknown metric: {0} (expected Conversions, Clicks or Impressions)")]
    UnknownMetric(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("no data loaded")]
    NoData,
}

/// Errors raised while turning a CSV export into metric rows.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: {message}")]
    Row { line: u64, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
