//! Row model of the ingested performance export.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub const ALL_ADVERTISERS: &str = "All Advertisers";
pub const ALL_CAMPAIGNS: &str = "All Campaigns";

/// One day of performance for a domain within a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub advertiser: String,
    pub campaign: String,
    pub domain: String,
    pub date: NaiveDate,
    /// Weighted conversions; fractional in the source export.
    pub conversions: f64,
    pub clicks: u64,
    pub impressions: u64,
}

impl MetricRow {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Conversions => self.conversions,
            Metric::Clicks => self.clicks as f64,
            Metric::Impressions => self.impressions as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Metric {
    #[default]
    Conversions,
    Clicks,
    Impressions,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Conversions, Metric::Clicks, Metric::Impressions];

    pub fn parse(raw: &str) -> Result<Self, EngineError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "conversions" => Ok(Self::Conversions),
            "clicks" => Ok(Self::Clicks),
            "impressions" => Ok(Self::Impressions),
            _ => Err(EngineError::UnknownMetric(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Conversions => "Conversions",
            Metric::Clicks => "Clicks",
            Metric::Impressions => "Impressions",
        }
    }

    /// This metric followed by the other two in canonical order.
    pub fn priority(&self) -> [Metric; 3] {
        match self {
            Metric::Conversions => [Metric::Conversions, Metric::Clicks, Metric::Impressions],
            Metric::Clicks => [Metric::Clicks, Metric::Conversions, Metric::Impressions],
            Metric::Impressions => [Metric::Impressions, Metric::Conversions, Metric::Clicks],
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip a leading `www.` (any case) so both spellings aggregate together.
pub fn clean_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("www.") => trimmed[4..].to_string(),
        _ => trimmed.to_string(),
    }
}

/// `None` for empty input or the given "all" sentinel.
pub fn selection<'a>(raw: Option<&'a str>, sentinel: &str) -> Option<&'a str> {
    match raw.map(str::trim) {
        None | Some("") => None,
        Some(value) if value == sentinel => None,
        Some(value) => Some(value),
    }
}
