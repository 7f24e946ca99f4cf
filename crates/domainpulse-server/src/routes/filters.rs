use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use domainpulse_core::{
    dashboard::filter_options,
    error::EngineError,
    record::{selection, ALL_ADVERTISERS},
};

use crate::{error::AppError, state::AppState};

/// `GET /api/filters`: dropdown contents and the valid anchor range.
#[tracing::instrument(skip(state))]
pub async fn filters(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let store = state.snapshot().await;
    if store.is_empty() {
        return Err(EngineError::NoData.into());
    }
    Ok(Json(filter_options(&store)))
}

#[derive(Debug, Deserialize)]
pub struct CampaignsQuery {
    pub advertiser: Option<String>,
}

/// `GET /api/campaigns?advertiser=`: campaigns of one advertiser, or all of
/// them for a missing advertiser or "All Advertisers".
#[tracing::instrument(skip(state))]
pub async fn campaigns(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CampaignsQuery>,
) -> impl IntoResponse {
    let store = state.snapshot().await;
    let advertiser = selection(query.advertiser.as_deref(), ALL_ADVERTISERS);
    Json(json!({ "campaigns": store.campaigns(advertiser) }))
}

#[derive(Debug, Deserialize)]
pub struct CampaignAdvertiserQuery {
    pub campaign: Option<String>,
}

/// `GET /api/campaign-advertiser?campaign=`: the advertiser owning a
/// campaign, or "All Advertisers" when the campaign is unknown.
#[tracing::instrument(skip(state))]
pub async fn campaign_advertiser(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CampaignAdvertiserQuery>,
) -> impl IntoResponse {
    let store = state.snapshot().await;
    let advertiser = query
        .campaign
        .as_deref()
        .and_then(|c| store.advertiser_for_campaign(c))
        .unwrap_or(ALL_ADVERTISERS)
        .to_string();
    Json(json!({ "advertiser": advertiser }))
}
