//! CSV export parsing.
//!
//! The export is addressed by header name so column order does not matter.
//! Both the raw report headers (`Day`, `Ad Impressions`, `Weighted Conversion`)
//! and the plain names (`Date`, `Impressions`, `Conversions`) are accepted.

use chrono::NaiveDate;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::IngestError;
use crate::record::{clean_domain, MetricRow};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Day", alias = "Date")]
    day: String,
    #[serde(rename = "Advertiser")]
    advertiser: String,
    #[serde(rename = "Campaign")]
    campaign: String,
    #[serde(rename = "Domain")]
    domain: String,
    #[serde(rename = "Ad Impressions", alias = "Impressions", default)]
    impressions: Option<u64>,
    #[serde(rename = "Clicks", default)]
    clicks: Option<u64>,
    #[serde(rename = "Weighted Conversion", alias = "Conversions", default)]
    conversions: Option<f64>,
}

/// Parse a full CSV export into metric rows, preserving file order.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<MetricRow>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let raw: CsvRow = record.deserialize(Some(&headers))?;
        rows.push(into_metric_row(raw, line)?);
    }
    Ok(rows)
}

fn into_metric_row(raw: CsvRow, line: u64) -> Result<MetricRow, IngestError> {
    let row_error = |message: String| IngestError::Row { line, message };

    let domain = clean_domain(&raw.domain);
    if domain.is_empty() {
        return Err(row_error("empty domain".to_string()));
    }
    let date = parse_day(&raw.day)
        .ok_or_else(|| row_error(format!("invalid date '{}'", raw.day)))?;
    let conversions = raw.conversions.unwrap_or(0.0);
    if !conversions.is_finite() || conversions < 0.0 {
        return Err(row_error(format!("invalid conversions value {conversions}")));
    }

    Ok(MetricRow {
        advertiser: raw.advertiser,
        campaign: raw.campaign,
        domain,
        date,
        conversions,
        clicks: raw.clicks.unwrap_or(0),
        impressions: raw.impressions.unwrap_or(0),
    })
}

/// Accepts `YYYY-MM-DD`, ignoring any trailing time component.
fn parse_day(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Short content hash identifying a loaded snapshot.
pub fn fingerprint(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(&digest[..8])
}
