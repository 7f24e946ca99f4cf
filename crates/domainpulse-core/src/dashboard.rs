//! Request-scoped pipeline producing the dashboard payload.
//!
//! `Filters -> WindowPair -> per-domain aggregates -> ranks -> comparisons ->
//! cohort, pies, series`. Nothing here mutates the store, so the same filters
//! over the same snapshot always serialize to identical bytes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate::aggregate;
use crate::change::{change_pct, compare_domains, DomainComparison, DomainStatus};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::projection::{export_rows, sort_domains, ExportRow, SortColumn, SortDirection};
use crate::rank::rank_week;
use crate::record::{selection, Metric, ALL_ADVERTISERS, ALL_CAMPAIGNS};
use crate::series::{contribution_points, domain_labels, pie_slices, ContributionPoint, PieSlice};
use crate::store::{RecordStore, Scope};
use crate::window::{resolve_windows, valid_anchor_range, Week, WindowPair};

/// Body of `POST /api/dashboard-data` as sent by the dashboard client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRequest {
    pub top_n: Option<i64>,
    pub advertiser: Option<String>,
    pub campaign: Option<String>,
    pub metric: Option<String>,
    /// Anchor date, `YYYY-MM-DD`; defaults to the last day in the dataset.
    pub date: Option<String>,
    pub sort_by: Option<SortColumn>,
    pub sort_dir: Option<SortDirection>,
}

/// Validated, typed form of a [`DashboardRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct Filters {
    pub scope: Scope,
    pub metric: Metric,
    pub anchor: NaiveDate,
    pub top_n: usize,
    pub sort: Option<(SortColumn, SortDirection)>,
}

impl Filters {
    /// Validate `req` against the snapshot it will run on.
    ///
    /// A concrete campaign pins the advertiser to the campaign's owner.
    pub fn resolve(
        req: &DashboardRequest,
        store: &RecordStore,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let metric = match req.metric.as_deref().map(str::trim) {
            None | Some("") => Metric::default(),
            Some(raw) => Metric::parse(raw)?,
        };

        let top_n = match req.top_n {
            None => config.default_top_n,
            Some(n) if n >= 1 && (n as u64) <= config.max_top_n as u64 => n as usize,
            Some(n) => {
                return Err(EngineError::InvalidFilter(format!(
                    "topN must be between 1 and {}, got {n}",
                    config.max_top_n
                )))
            }
        };

        let anchor = match req.date.as_deref().map(str::trim) {
            None | Some("") => store.date_range().map(|(_, max)| max).ok_or(EngineError::NoData)?,
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| EngineError::InvalidDate(raw.to_string()))?,
        };

        let campaign = selection(req.campaign.as_deref(), ALL_CAMPAIGNS).map(str::to_string);
        let advertiser = campaign
            .as_deref()
            .and_then(|c| store.advertiser_for_campaign(c))
            .or_else(|| selection(req.advertiser.as_deref(), ALL_ADVERTISERS))
            .map(str::to_string);

        let sort = req
            .sort_by
            .map(|column| (column, req.sort_dir.unwrap_or_default()));

        Ok(Self {
            scope: Scope {
                advertiser,
                campaign,
            },
            metric,
            anchor,
            top_n,
            sort,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub week1_total: f64,
    pub week2_total: f64,
    pub total_change_pct: Option<f64>,
    pub active_domains_week1: usize,
    pub active_domains_week2: usize,
    pub new_domains: usize,
    pub dropped_domains: usize,
    pub decline_count: usize,
}

/// Filters as actually applied, echoed back so the client can sync its
/// controls (e.g. the advertiser implied by a campaign).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFilters {
    pub advertiser: String,
    pub campaign: String,
    pub metric: Metric,
    pub date: NaiveDate,
    pub top_n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub kpis: Kpis,
    /// Union of both weeks' Top-N.
    pub domain_data: Vec<DomainComparison>,
    pub decline_cohort: Vec<String>,
    pub contribution_data: Vec<ContributionPoint>,
    pub pie_data_week1: Vec<PieSlice>,
    pub pie_data_week2: Vec<PieSlice>,
    pub week_ranges: WindowPair,
    pub filters: AppliedFilters,
}

impl DashboardResponse {
    /// Export rows for the decline cohort, in the table's current order.
    pub fn export_rows(&self) -> Vec<ExportRow> {
        export_rows(&self.domain_data)
    }
}

/// Run the whole comparison for already-resolved filters.
pub fn compute_dashboard(
    store: &RecordStore,
    filters: &Filters,
    config: &EngineConfig,
) -> Result<DashboardResponse, EngineError> {
    let windows = resolve_windows(filters.anchor, store.date_range())?;
    let span = windows.span();
    let agg = aggregate(
        store.rows_between(&filters.scope, span.start, span.end),
        &windows,
        filters.metric,
    );

    let week1 = rank_week(&agg, Week::One, config.tie_break);
    let week2 = rank_week(&agg, Week::Two, config.tie_break);
    let comparisons = compare_domains(
        &agg,
        &week1,
        &week2,
        filters.top_n,
        config.decline_threshold_pct,
    );

    let cohort_idx: Vec<usize> = comparisons
        .iter()
        .enumerate()
        .filter(|(_, c)| c.significant_decline)
        .map(|(idx, _)| idx)
        .collect();

    let kpis = Kpis {
        week1_total: agg.week1_total,
        week2_total: agg.week2_total,
        total_change_pct: change_pct(agg.week1_total, agg.week2_total),
        active_domains_week1: week1.ranked_count(),
        active_domains_week2: week2.ranked_count(),
        new_domains: count_status(&comparisons, DomainStatus::New),
        dropped_domains: count_status(&comparisons, DomainStatus::Dropped),
        decline_count: cohort_idx.len(),
    };

    let labels = domain_labels(&agg);
    let contribution_data = contribution_points(&windows, &agg, &labels, &cohort_idx);
    let pie_data_week1 = pie_slices(&agg, &labels, &week1, Week::One, filters.top_n);
    let pie_data_week2 = pie_slices(&agg, &labels, &week2, Week::Two, filters.top_n);

    let mut domain_data: Vec<DomainComparison> =
        comparisons.into_iter().filter(|c| c.tier.is_some()).collect();
    match filters.sort {
        Some((column, direction)) => sort_domains(&mut domain_data, column, direction),
        None => domain_data.sort_by(|a, b| a.tier.cmp(&b.tier).then_with(|| a.domain.cmp(&b.domain))),
    }

    let decline_cohort = domain_data
        .iter()
        .filter(|c| c.significant_decline)
        .map(|c| c.domain.clone())
        .collect();

    Ok(DashboardResponse {
        kpis,
        domain_data,
        decline_cohort,
        contribution_data,
        pie_data_week1,
        pie_data_week2,
        week_ranges: windows,
        filters: AppliedFilters {
            advertiser: filters
                .scope
                .advertiser
                .clone()
                .unwrap_or_else(|| ALL_ADVERTISERS.to_string()),
            campaign: filters
                .scope
                .campaign
                .clone()
                .unwrap_or_else(|| ALL_CAMPAIGNS.to_string()),
            metric: filters.metric,
            date: filters.anchor,
            top_n: filters.top_n,
        },
    })
}

/// Resolve `req` and run the comparison in one step.
pub fn run_dashboard(
    store: &RecordStore,
    req: &DashboardRequest,
    config: &EngineConfig,
) -> Result<DashboardResponse, EngineError> {
    let filters = Filters::resolve(req, store, config)?;
    compute_dashboard(store, &filters, config)
}

fn count_status(rows: &[DomainComparison], status: DomainStatus) -> usize {
    rows.iter().filter(|c| c.status == status).count()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetRange {
    pub min: NaiveDate,
    pub max: NaiveDate,
    /// Earliest anchor with two full weeks of history; `None` when the
    /// dataset spans fewer than 14 days.
    pub min_anchor: Option<NaiveDate>,
}

/// Dropdown contents for the dashboard's filter bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub advertisers: Vec<String>,
    pub metrics: Vec<Metric>,
    pub date_range: Option<DatasetRange>,
    pub data_version: String,
}

pub fn filter_options(store: &RecordStore) -> FilterOptions {
    FilterOptions {
        advertisers: store.advertisers(),
        metrics: Metric::ALL.to_vec(),
        date_range: store.date_range().map(|(min, max)| DatasetRange {
            min,
            max,
            min_anchor: valid_anchor_range(min, max).map(|(first, _)| first),
        }),
        data_version: store.fingerprint().to_string(),
    }
}
