//! Per-week ranking of domains.

use std::cmp::Ordering;

use crate::aggregate::Aggregation;
use crate::config::TieBreak;
use crate::window::Week;

/// Ranks of one week, indexed by position in [`Aggregation::domains`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekRanking {
    ranks: Vec<Option<usize>>,
    /// Domain indices ordered by rank (rank 1 first).
    order: Vec<usize>,
}

impl WeekRanking {
    pub fn rank(&self, idx: usize) -> Option<usize> {
        self.ranks.get(idx).copied().flatten()
    }

    pub fn ordered(&self) -> &[usize] {
        &self.order
    }

    /// Indices of the top `n` ranked domains.
    pub fn top(&self, n: usize) -> &[usize] {
        &self.order[..n.min(self.order.len())]
    }

    pub fn in_top(&self, idx: usize, n: usize) -> bool {
        self.rank(idx).is_some_and(|rank| rank <= n)
    }

    pub fn ranked_count(&self) -> usize {
        self.order.len()
    }
}

/// Rank the domains active in `week`.
///
/// Domains whose value is zero that week get no rank. The rest are ordered by
/// value descending and numbered 1, 2, 3, ... without shared positions; equal
/// values are ordered by `tie_break`, always ending in first-seen order.
pub fn rank_week(agg: &Aggregation, week: Week, tie_break: TieBreak) -> WeekRanking {
    let mut order: Vec<usize> = (0..agg.domains.len())
        .filter(|&idx| agg.value(idx, week) > 0.0)
        .collect();

    order.sort_by(|&a, &b| {
        let by_value = agg.value(b, week).total_cmp(&agg.value(a, week));
        let by_secondary = || match tie_break {
            TieBreak::FirstSeen => Ordering::Equal,
            TieBreak::SecondaryMetrics => {
                let (ta, tb) = (agg.domains[a].totals(week), agg.domains[b].totals(week));
                agg.metric.priority()[1..]
                    .iter()
                    .map(|&metric| tb.get(metric).total_cmp(&ta.get(metric)))
                    .find(|ord| ord.is_ne())
                    .unwrap_or(Ordering::Equal)
            }
        };
        by_value.then_with(by_secondary).then(a.cmp(&b))
    });

    let mut ranks = vec![None; agg.domains.len()];
    for (position, &idx) in order.iter().enumerate() {
        ranks[idx] = Some(position + 1);
    }

    WeekRanking { ranks, order }
}
