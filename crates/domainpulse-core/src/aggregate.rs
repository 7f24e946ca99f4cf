//! Per-domain sums over the two comparison windows.

use std::collections::HashMap;

use crate::record::{Metric, MetricRow};
use crate::window::{Week, WindowPair, SPAN_DAYS};

/// Decimal places kept on every summed value.
pub const VALUE_DECIMALS: i32 = 2;

/// Round a summed value to [`VALUE_DECIMALS`], dropping the float noise that
/// adding fractional conversions leaves behind. Never returns `-0.0`.
pub fn round_value(value: f64) -> f64 {
    let scale = 10f64.powi(VALUE_DECIMALS);
    (value * scale).round() / scale + 0.0
}

/// Sums of every metric for one domain in one week.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricTotals {
    pub conversions: f64,
    pub clicks: f64,
    pub impressions: f64,
}

impl MetricTotals {
    fn add(&mut self, row: &MetricRow) {
        self.conversions += row.conversions;
        self.clicks += row.clicks as f64;
        self.impressions += row.impressions as f64;
    }

    fn rounded(self) -> Self {
        Self {
            conversions: round_value(self.conversions),
            clicks: round_value(self.clicks),
            impressions: round_value(self.impressions),
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Conversions => self.conversions,
            Metric::Clicks => self.clicks,
            Metric::Impressions => self.impressions,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainTotals {
    pub domain: String,
    pub week1: MetricTotals,
    pub week2: MetricTotals,
    /// Selected metric per day across both windows, zero-filled.
    pub daily: [f64; SPAN_DAYS],
}

impl DomainTotals {
    fn new(domain: String) -> Self {
        Self {
            domain,
            week1: MetricTotals::default(),
            week2: MetricTotals::default(),
            daily: [0.0; SPAN_DAYS],
        }
    }

    pub fn totals(&self, week: Week) -> &MetricTotals {
        match week {
            Week::One => &self.week1,
            Week::Two => &self.week2,
        }
    }
}

/// Result of aggregating one request's rows.
///
/// `domains` is in first-seen order: the order in which each domain first
/// appears among the input rows that fall inside the two windows.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub metric: Metric,
    pub domains: Vec<DomainTotals>,
    pub week1_total: f64,
    pub week2_total: f64,
}

impl Aggregation {
    pub fn value(&self, idx: usize, week: Week) -> f64 {
        self.domains[idx].totals(week).get(self.metric)
    }
}

/// Sum `rows` into per-domain week totals. Rows outside both windows are
/// ignored; a domain seen in only one week keeps zeros for the other. Every
/// sum is rounded with [`round_value`] once all rows are in.
pub fn aggregate<'a>(
    rows: impl IntoIterator<Item = &'a MetricRow>,
    windows: &WindowPair,
    metric: Metric,
) -> Aggregation {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut domains: Vec<DomainTotals> = Vec::new();
    let mut week1_total = 0.0;
    let mut week2_total = 0.0;

    for row in rows {
        let Some(week) = windows.week_of(row.date) else {
            continue;
        };
        let idx = *index.entry(row.domain.as_str()).or_insert_with(|| {
            domains.push(DomainTotals::new(row.domain.clone()));
            domains.len() - 1
        });
        let entry = &mut domains[idx];
        let value = row.value(metric);
        match week {
            Week::One => {
                entry.week1.add(row);
                week1_total += value;
            }
            Week::Two => {
                entry.week2.add(row);
                week2_total += value;
            }
        }
        if let Some(day) = windows.day_index(row.date) {
            entry.daily[day] += value;
        }
    }

    for entry in &mut domains {
        entry.week1 = entry.week1.rounded();
        entry.week2 = entry.week2.rounded();
        for value in &mut entry.daily {
            *value = round_value(*value);
        }
    }

    Aggregation {
        metric,
        domains,
        week1_total: round_value(week1_total),
        week2_total: round_value(week2_total),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn row(domain: &str, day: u32, conversions: f64, clicks: u64) -> MetricRow {
        MetricRow {
            advertiser: "Acme".to_string(),
            campaign: "Spring".to_string(),
            domain: domain.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, day).expect("date"),
            conversions,
            clicks,
            impressions: clicks * 10,
        }
    }

    fn windows() -> WindowPair {
        WindowPair::ending_on(NaiveDate::from_ymd_opt(2026, 3, 14).expect("date"))
    }

    #[test]
    fn sums_each_week_and_keeps_one_sided_domains() {
        let rows = vec![
            row("a.com", 1, 10.0, 1),
            row("a.com", 7, 5.0, 1),
            row("a.com", 8, 3.0, 1),
            row("new.com", 9, 50.0, 2),
            row("gone.com", 2, 7.0, 3),
        ];
        let agg = aggregate(&rows, &windows(), Metric::Conversions);

        let names: Vec<_> = agg.domains.iter().map(|d| d.domain.as_str()).collect();
        assert_eq!(names, vec!["a.com", "new.com", "gone.com"]);
        assert_eq!(agg.value(0, Week::One), 15.0);
        assert_eq!(agg.value(0, Week::Two), 3.0);
        assert_eq!(agg.value(1, Week::One), 0.0);
        assert_eq!(agg.value(1, Week::Two), 50.0);
        assert_eq!(agg.value(2, Week::Two), 0.0);
        assert_eq!(agg.week1_total, 22.0);
        assert_eq!(agg.week2_total, 53.0);
    }

    #[test]
    fn rows_outside_windows_are_ignored() {
        let rows = vec![row("early.com", 15, 9.0, 1)];
        let agg = aggregate(&rows, &windows(), Metric::Conversions);
        assert!(agg.domains.is_empty());
        assert_eq!(agg.week1_total, 0.0);
    }

    #[test]
    fn daily_series_is_zero_filled_and_chronological() {
        let rows = vec![
            row("a.com", 14, 1.0, 4),
            row("a.com", 1, 1.0, 2),
            row("a.com", 1, 1.0, 3),
        ];
        let agg = aggregate(&rows, &windows(), Metric::Clicks);
        let daily = agg.domains[0].daily;
        assert_eq!(daily[0], 5.0);
        assert_eq!(daily[13], 4.0);
        assert_eq!(daily[1..13].iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn all_metrics_are_collected_regardless_of_selection() {
        let rows = vec![row("a.com", 3, 2.5, 4)];
        let agg = aggregate(&rows, &windows(), Metric::Impressions);
        let totals = agg.domains[0].week1;
        assert_eq!(totals.conversions, 2.5);
        assert_eq!(totals.clicks, 4.0);
        assert_eq!(totals.impressions, 40.0);
        assert_eq!(agg.week1_total, 40.0);
    }

    #[test]
    fn fractional_sums_are_rounded_to_cents() {
        let rows = vec![
            row("a.com", 1, 0.1, 0),
            row("a.com", 2, 0.2, 0),
            row("a.com", 9, 0.1, 0),
        ];
        let agg = aggregate(&rows, &windows(), Metric::Conversions);
        assert_eq!(agg.value(0, Week::One), 0.3);
        assert_eq!(agg.week1_total, 0.3);
        assert_eq!(agg.value(0, Week::Two), 0.1);
    }

    #[test]
    fn rounding_never_yields_negative_zero() {
        assert_eq!(round_value(0.30000000000000004), 0.3);
        assert_eq!(round_value(2.004), 2.0);
        assert!(round_value(-0.001).is_sign_positive());
    }
}
