//! Immutable in-memory snapshot of the loaded export.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};

use crate::record::MetricRow;

/// Advertiser/campaign restriction applied before any aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub advertiser: Option<String>,
    pub campaign: Option<String>,
}

impl Scope {
    pub fn matches(&self, row: &MetricRow) -> bool {
        self.advertiser
            .as_deref()
            .map_or(true, |advertiser| row.advertiser == advertiser)
            && self
                .campaign
                .as_deref()
                .map_or(true, |campaign| row.campaign == campaign)
    }
}

/// A complete, read-only dataset.
///
/// A store is never mutated after construction; reloading builds a new store
/// and swaps the shared reference, so readers always see one whole snapshot.
#[derive(Debug, Clone)]
pub struct RecordStore {
    rows: Vec<MetricRow>,
    date_range: Option<(NaiveDate, NaiveDate)>,
    advertisers: BTreeSet<String>,
    /// campaign -> owning advertiser (first occurrence wins)
    campaign_owner: BTreeMap<String, String>,
    fingerprint: String,
    loaded_at: DateTime<Utc>,
}

impl RecordStore {
    pub fn new(rows: Vec<MetricRow>, fingerprint: impl Into<String>) -> Self {
        let mut advertisers = BTreeSet::new();
        let mut campaign_owner = BTreeMap::new();
        let mut date_range: Option<(NaiveDate, NaiveDate)> = None;

        for row in &rows {
            if !advertisers.contains(&row.advertiser) {
                advertisers.insert(row.advertiser.clone());
            }
            campaign_owner
                .entry(row.campaign.clone())
                .or_insert_with(|| row.advertiser.clone());
            date_range = Some(match date_range {
                None => (row.date, row.date),
                Some((min, max)) => (min.min(row.date), max.max(row.date)),
            });
        }

        Self {
            rows,
            date_range,
            advertisers,
            campaign_owner,
            fingerprint: fingerprint.into(),
            loaded_at: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), "")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(min, max)` date over all rows, `None` when the store is empty.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.date_range
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Sorted advertiser names.
    pub fn advertisers(&self) -> Vec<String> {
        self.advertisers.iter().cloned().collect()
    }

    /// Sorted campaign names, optionally limited to one advertiser.
    pub fn campaigns(&self, advertiser: Option<&str>) -> Vec<String> {
        match advertiser {
            None => self.campaign_owner.keys().cloned().collect(),
            Some(advertiser) => {
                let campaigns: BTreeSet<&String> = self
                    .rows
                    .iter()
                    .filter(|row| row.advertiser == advertiser)
                    .map(|row| &row.campaign)
                    .collect();
                campaigns.into_iter().cloned().collect()
            }
        }
    }

    pub fn advertiser_for_campaign(&self, campaign: &str) -> Option<&str> {
        self.campaign_owner.get(campaign).map(String::as_str)
    }

    /// Rows matching `scope`, in snapshot order.
    pub fn filtered<'a>(&'a self, scope: &'a Scope) -> impl Iterator<Item = &'a MetricRow> + 'a {
        self.rows.iter().filter(move |row| scope.matches(row))
    }

    /// Rows matching `scope` with `start <= date <= end`, in snapshot order.
    pub fn rows_between<'a>(
        &'a self,
        scope: &'a Scope,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = &'a MetricRow> + 'a {
        self.filtered(scope)
            .filter(move |row| row.date >= start && row.date <= end)
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::empty()
    }
}
