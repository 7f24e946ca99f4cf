//! Sorting of the domain table and the CSV export of the decline cohort.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::aggregate::round_value;
use crate::change::DomainComparison;
use crate::record::Metric;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    Domain,
    Week1Value,
    Rank1,
    Week2Value,
    Rank2,
    Delta,
    ChangePct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

fn numeric_key(row: &DomainComparison, column: SortColumn) -> Option<f64> {
    match column {
        SortColumn::Domain => None,
        SortColumn::Week1Value => Some(row.week1_value),
        SortColumn::Rank1 => row.rank1.map(|r| r as f64),
        SortColumn::Week2Value => Some(row.week2_value),
        SortColumn::Rank2 => row.rank2.map(|r| r as f64),
        SortColumn::Delta => Some(row.delta),
        SortColumn::ChangePct => row.change_pct,
    }
}

fn compare_rows(
    a: &DomainComparison,
    b: &DomainComparison,
    column: SortColumn,
    direction: SortDirection,
) -> Ordering {
    if column == SortColumn::Domain {
        return direction.apply(a.domain.cmp(&b.domain));
    }
    // Missing keys go last in both directions.
    match (numeric_key(a, column), numeric_key(b, column)) {
        (Some(x), Some(y)) => direction.apply(x.total_cmp(&y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by `column`; rows without a value for the column stay last.
pub fn sort_domains(rows: &mut [DomainComparison], column: SortColumn, direction: SortDirection) {
    rows.sort_by(|a, b| compare_rows(a, b, column, direction));
}

/// One line of the decline export, already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub domain: String,
    pub week1_value: String,
    pub week1_rank: String,
    pub week2_value: String,
    pub week2_rank: String,
    pub delta: String,
    pub change_pct: String,
}

/// At most two decimals; whole numbers print without a fractional part
/// (`100`, `12.5`, `0.3`).
pub fn format_value(value: f64) -> String {
    let value = round_value(value);
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

fn format_delta(delta: f64) -> String {
    let delta = round_value(delta);
    if delta > 0.0 {
        format!("+{}", format_value(delta))
    } else {
        format_value(delta)
    }
}

/// Project the significant-decline rows of `rows`, keeping their order.
pub fn export_rows(rows: &[DomainComparison]) -> Vec<ExportRow> {
    rows.iter()
        .filter(|row| row.significant_decline)
        .map(|row| ExportRow {
            domain: row.domain.clone(),
            week1_value: format_value(row.week1_value),
            week1_rank: row.rank1.map(|r| r.to_string()).unwrap_or_default(),
            week2_value: format_value(row.week2_value),
            week2_rank: row.rank2.map(|r| r.to_string()).unwrap_or_default(),
            delta: format_delta(row.delta),
            change_pct: row
                .change_pct
                .map(|pct| format!("{pct:.2}"))
                .unwrap_or_default(),
        })
        .collect()
}

/// Spreadsheet apps evaluate cells starting with these as formulas; a leading
/// quote makes them literal.
fn sanitize_text(val: &str) -> std::borrow::Cow<'_, str> {
    if val.starts_with(['=', '+', '-', '@', '\t', '\r']) {
        std::borrow::Cow::Owned(format!("'{val}"))
    } else {
        std::borrow::Cow::Borrowed(val)
    }
}

/// Domain names are always quoted; numbers never are.
fn quoted(val: &str) -> String {
    format!("\"{}\"", sanitize_text(val).replace('"', "\"\""))
}

pub fn export_header(metric: Metric) -> [String; 7] {
    [
        "Domain".to_string(),
        "Week 1 Value".to_string(),
        "Week 1 Rank".to_string(),
        "Week 2 Value".to_string(),
        "Week 2 Rank".to_string(),
        format!("{metric} Change"),
        "Change %".to_string(),
    ]
}

/// Render export rows as CSV text with a header line.
pub fn render_csv(rows: &[ExportRow], metric: Metric) -> anyhow::Result<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(Vec::with_capacity((rows.len() + 1).saturating_mul(64)));

    wtr.write_record(export_header(metric))
        .map_err(|e| anyhow::anyhow!("csv write_record failed: {e}"))?;

    for row in rows {
        wtr.write_record([
            quoted(&row.domain).as_str(),
            row.week1_value.as_str(),
            row.week1_rank.as_str(),
            row.week2_value.as_str(),
            row.week2_rank.as_str(),
            row.delta.as_str(),
            row.change_pct.as_str(),
        ])
        .map_err(|e| anyhow::anyhow!("csv write_record failed: {e}"))?;
    }

    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("csv flush failed: {e}"))
}
