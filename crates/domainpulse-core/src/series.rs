//! Chart payloads: per-day contribution rows and Top-N pie slices.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::{round_value, Aggregation};
use crate::rank::WeekRanking;
use crate::window::{Week, WindowPair};

/// Chart labels are cut to this many characters.
pub const LABEL_MAX_CHARS: usize = 40;
pub const OTHERS_LABEL: &str = "Others";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionPoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
}

pub fn chart_label(domain: &str) -> String {
    domain.chars().take(LABEL_MAX_CHARS).collect()
}

/// One label per aggregated domain, indexed like [`Aggregation::domains`].
///
/// Labels that collide after truncation (or with [`OTHERS_LABEL`]) get a
/// `~2`, `~3`, ... suffix in first-seen order, still within
/// [`LABEL_MAX_CHARS`].
pub fn domain_labels(agg: &Aggregation) -> Vec<String> {
    let mut used = BTreeSet::from([OTHERS_LABEL.to_string()]);
    agg.domains
        .iter()
        .map(|totals| {
            let mut label = chart_label(&totals.domain);
            let mut n = 2;
            while used.contains(&label) {
                let suffix = format!("~{n}");
                label = totals
                    .domain
                    .chars()
                    .take(LABEL_MAX_CHARS - suffix.len())
                    .chain(suffix.chars())
                    .collect();
                n += 1;
            }
            used.insert(label.clone());
            label
        })
        .collect()
}

/// One row per day of the 14-day span with each listed domain's value that day.
pub fn contribution_points(
    windows: &WindowPair,
    agg: &Aggregation,
    labels: &[String],
    domains: &[usize],
) -> Vec<ContributionPoint> {
    windows
        .span()
        .days()
        .enumerate()
        .map(|(day, date)| ContributionPoint {
            date,
            values: domains
                .iter()
                .map(|&idx| (labels[idx].clone(), agg.domains[idx].daily[day]))
                .collect(),
        })
        .collect()
}

/// Top-N slices of `week` followed by a single "Others" slice holding the
/// rest of that week's active domains. Slices always sum to the week total;
/// "Others" is left out when nothing remains.
pub fn pie_slices(
    agg: &Aggregation,
    labels: &[String],
    ranking: &WeekRanking,
    week: Week,
    top_n: usize,
) -> Vec<PieSlice> {
    let top = ranking.top(top_n);
    let mut slices: Vec<PieSlice> = top
        .iter()
        .map(|&idx| PieSlice {
            name: labels[idx].clone(),
            value: agg.value(idx, week),
        })
        .collect();

    let others = round_value(
        ranking.ordered()[top.len()..]
            .iter()
            .map(|&idx| agg.value(idx, week))
            .sum(),
    );
    if others > 0.0 {
        slices.push(PieSlice {
            name: OTHERS_LABEL.to_string(),
            value: others,
        });
    }
    slices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::config::TieBreak;
    use crate::rank::rank_week;
    use crate::record::{Metric, MetricRow};

    fn row(domain: &str, day: u32, conversions: f64) -> MetricRow {
        MetricRow {
            advertiser: "Acme".to_string(),
            campaign: "Spring".to_string(),
            domain: domain.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, day).expect("date"),
            conversions,
            clicks: 0,
            impressions: 0,
        }
    }

    fn windows() -> WindowPair {
        WindowPair::ending_on(NaiveDate::from_ymd_opt(2026, 3, 14).expect("date"))
    }

    #[test]
    fn pie_groups_remainder_into_others_and_preserves_total() {
        let rows = vec![
            row("a.com", 1, 40.0),
            row("b.com", 2, 30.0),
            row("c.com", 3, 20.0),
            row("d.com", 4, 10.0),
            row("e.com", 9, 5.0),
        ];
        let agg = aggregate(&rows, &windows(), Metric::Conversions);
        let ranking = rank_week(&agg, Week::One, TieBreak::FirstSeen);
        let pie = pie_slices(&agg, &domain_labels(&agg), &ranking, Week::One, 2);

        let names: Vec<_> = pie.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a.com", "b.com", "Others"]);
        assert_eq!(pie[2].value, 30.0);
        let sum: f64 = pie.iter().map(|s| s.value).sum();
        assert!((sum - agg.week1_total).abs() < 1e-9);
    }

    #[test]
    fn pie_omits_empty_others() {
        let rows = vec![row("a.com", 1, 4.0), row("b.com", 1, 2.0)];
        let agg = aggregate(&rows, &windows(), Metric::Conversions);
        let ranking = rank_week(&agg, Week::One, TieBreak::FirstSeen);
        let pie = pie_slices(&agg, &domain_labels(&agg), &ranking, Week::One, 10);
        assert_eq!(pie.len(), 2);
        assert!(pie.iter().all(|s| s.name != OTHERS_LABEL));
    }

    #[test]
    fn contribution_has_one_point_per_day() {
        let rows = vec![row("a.com", 1, 4.0), row("a.com", 12, 2.0)];
        let agg = aggregate(&rows, &windows(), Metric::Conversions);
        let points = contribution_points(&windows(), &agg, &domain_labels(&agg), &[0]);
        assert_eq!(points.len(), 14);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2026, 3, 1).expect("date"));
        assert_eq!(points[0].values["a.com"], 4.0);
        assert_eq!(points[11].values["a.com"], 2.0);
        assert_eq!(points[5].values["a.com"], 0.0);
    }

    #[test]
    fn contribution_point_serializes_domain_keys_inline() {
        let point = ContributionPoint {
            date: NaiveDate::from_ymd_opt(2026, 3, 1).expect("date"),
            values: BTreeMap::from([("a.com".to_string(), 3.0)]),
        };
        let json = serde_json::to_value(&point).expect("json");
        assert_eq!(json["date"], "2026-03-01");
        assert_eq!(json["a.com"], 3.0);
    }

    #[test]
    fn truncated_labels_stay_distinct() {
        let prefix = "x".repeat(LABEL_MAX_CHARS);
        let rows = vec![
            row(&format!("{prefix}-one.com"), 1, 5.0),
            row(&format!("{prefix}-two.com"), 2, 3.0),
            row("Others", 3, 1.0),
        ];
        let agg = aggregate(&rows, &windows(), Metric::Conversions);
        let labels = domain_labels(&agg);
        assert_eq!(labels[0], prefix);
        assert_eq!(labels[1], format!("{}~2", &prefix[..LABEL_MAX_CHARS - 2]));
        assert_eq!(labels[2], "Others~2");
        assert!(labels.iter().all(|l| l.chars().count() <= LABEL_MAX_CHARS));

        let points = contribution_points(&windows(), &agg, &labels, &[0, 1]);
        assert_eq!(points[0].values.len(), 2);
        assert_eq!(points[0].values[&labels[0]], 5.0);
        assert_eq!(points[1].values[&labels[1]], 3.0);

        let ranking = rank_week(&agg, Week::One, TieBreak::FirstSeen);
        let pie = pie_slices(&agg, &labels, &ranking, Week::One, 2);
        let names: Vec<_> = pie.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec![labels[0].as_str(), labels[1].as_str(), "Others"]);
    }

    #[test]
    fn labels_are_truncated_by_characters() {
        let long = "é".repeat(50);
        assert_eq!(chart_label(&long).chars().count(), LABEL_MAX_CHARS);
        assert_eq!(chart_label("short.com"), "short.com");
    }
}
