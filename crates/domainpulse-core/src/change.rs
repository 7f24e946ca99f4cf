//! Week-over-week change, classification and the significant-decline cohort.

use serde::Serialize;

use crate::aggregate::{round_value, Aggregation};
use crate::rank::WeekRanking;
use crate::window::Week;

/// Slack for float noise when comparing a change against the threshold, so a
/// drop of exactly the threshold always qualifies.
const THRESHOLD_EPSILON: f64 = 1e-9;

/// Presence of a domain across the two weeks, by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainStatus {
    New,
    Dropped,
    Continuing,
}

/// Movement of a domain relative to the Top-N of each week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Top-N in both weeks.
    Maintained,
    /// Top-N in week 2 only.
    New,
    /// Top-N in week 1 only.
    Dropped,
}

/// One domain's comparison row as delivered to the dashboard.
///
/// Values keep the `week1Conv`/`week2Conv` wire names whatever metric is
/// selected, because that is what the dashboard client reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainComparison {
    pub domain: String,
    pub tier: Option<Tier>,
    pub status: DomainStatus,
    #[serde(rename = "week1Conv")]
    pub week1_value: f64,
    pub rank1: Option<usize>,
    #[serde(rename = "week2Conv")]
    pub week2_value: f64,
    pub rank2: Option<usize>,
    pub delta: f64,
    #[serde(rename = "change")]
    pub change_pct: Option<f64>,
    /// `rank1 - rank2`; positive means the domain climbed.
    pub rank_change: Option<i64>,
    pub significant_decline: bool,
    pub trend: Vec<f64>,
}

/// Percentage change from `week1` to `week2`; undefined when `week1` is zero.
pub fn change_pct(week1: f64, week2: f64) -> Option<f64> {
    (week1 > 0.0).then(|| ((week2 - week1) / week1) * 100.0)
}

pub fn classify(week1: f64, week2: f64) -> DomainStatus {
    if week1 == 0.0 && week2 > 0.0 {
        DomainStatus::New
    } else if week2 == 0.0 && week1 > 0.0 {
        DomainStatus::Dropped
    } else {
        DomainStatus::Continuing
    }
}

pub fn tier(in_top_week1: bool, in_top_week2: bool) -> Option<Tier> {
    match (in_top_week1, in_top_week2) {
        (true, true) => Some(Tier::Maintained),
        (false, true) => Some(Tier::New),
        (true, false) => Some(Tier::Dropped),
        (false, false) => None,
    }
}

/// A change qualifies as a significant decline when it is defined and at or
/// below `-threshold_pct`.
pub fn is_decline(change_pct: Option<f64>, threshold_pct: f64) -> bool {
    change_pct.is_some_and(|pct| pct <= -threshold_pct + THRESHOLD_EPSILON)
}

/// Build a comparison row for every aggregated domain, in first-seen order.
///
/// The decline flag additionally requires Top-N membership in at least one
/// week, so a small domain with a steep drop does not qualify.
pub fn compare_domains(
    agg: &Aggregation,
    week1: &WeekRanking,
    week2: &WeekRanking,
    top_n: usize,
    threshold_pct: f64,
) -> Vec<DomainComparison> {
    agg.domains
        .iter()
        .enumerate()
        .map(|(idx, totals)| {
            let week1_value = agg.value(idx, Week::One);
            let week2_value = agg.value(idx, Week::Two);
            let rank1 = week1.rank(idx);
            let rank2 = week2.rank(idx);
            let change = change_pct(week1_value, week2_value);
            let tier = tier(week1.in_top(idx, top_n), week2.in_top(idx, top_n));
            let rank_change = match (rank1, rank2) {
                (Some(r1), Some(r2)) => Some(r1 as i64 - r2 as i64),
                _ => None,
            };

            DomainComparison {
                domain: totals.domain.clone(),
                tier,
                status: classify(week1_value, week2_value),
                week1_value,
                rank1,
                week2_value,
                rank2,
                delta: round_value(week2_value - week1_value),
                change_pct: change,
                rank_change,
                significant_decline: tier.is_some() && is_decline(change, threshold_pct),
                trend: totals.daily.to_vec(),
            }
        })
        .collect()
}
