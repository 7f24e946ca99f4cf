/// BDD integration tests for the dashboard comparison endpoint.
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use domainpulse_core::config::{Config, EngineConfig};
use domainpulse_core::record::MetricRow;
use domainpulse_core::source::StaticSource;
use domainpulse_core::store::RecordStore;
use domainpulse_server::app::build_app;
use domainpulse_server::state::AppState;

fn test_config() -> Config {
    Config {
        port: 0,
        data_path: "/nonexistent/domain_data.csv".to_string(),
        cors_origins: vec![],
        engine: EngineConfig::default(),
    }
}

fn row(domain: &str, day: u32, conversions: f64) -> MetricRow {
    MetricRow {
        advertiser: "Acme".to_string(),
        campaign: "Spring".to_string(),
        domain: domain.to_string(),
        date: NaiveDate::from_ymd_opt(2026, 3, day).expect("date"),
        conversions,
        clicks: conversions as u64,
        impressions: conversions as u64 * 10,
    }
}

/// Two weeks ending 2026-03-14: example.com 100 -> 85, new.com 0 -> 50.
fn fixture_rows() -> Vec<MetricRow> {
    vec![
        row("big.com", 2, 500.0),
        row("example.com", 3, 100.0),
        row("big.com", 9, 600.0),
        row("example.com", 10, 85.0),
        row("new.com", 11, 50.0),
        row("tail.com", 1, 1.0),
        row("tail.com", 14, 1.0),
    ]
}

async fn setup() -> axum::Router {
    let source = Arc::new(StaticSource::new(fixture_rows()));
    let state = Arc::new(AppState::bootstrap(test_config(), source).await);
    build_app(state)
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

fn domain<'a>(json: &'a Value, name: &str) -> &'a Value {
    json["domainData"]
        .as_array()
        .expect("domainData array")
        .iter()
        .find(|d| d["domain"] == name)
        .unwrap_or_else(|| panic!("{name} missing"))
}

// ============================================================
// BDD: A 15% drop inside the Top-N is a significant decline
// ============================================================
#[tokio::test]
async fn test_dashboard_reports_decline() {
    let app = setup().await;
    let response = app
        .oneshot(post_json(
            "/api/dashboard-data",
            json!({"topN": 10, "metric": "Conversions", "date": "2026-03-14"}),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    let example = domain(&json, "example.com");
    assert_eq!(example["week1Conv"], 100.0);
    assert_eq!(example["week2Conv"], 85.0);
    assert_eq!(example["change"], -15.0);
    assert_eq!(example["significantDecline"], true);
    assert_eq!(example["trend"].as_array().map(Vec::len), Some(14));
    assert_eq!(json["declineCohort"], json!(["example.com"]));
    assert_eq!(json["kpis"]["declineCount"], 1);
}

// ============================================================
// BDD: A domain new in week 2 has a null change
// ============================================================
#[tokio::test]
async fn test_dashboard_new_domain_has_null_change() {
    let app = setup().await;
    let response = app
        .oneshot(post_json(
            "/api/dashboard-data",
            json!({"date": "2026-03-14"}),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    let new = domain(&json, "new.com");
    assert!(new["change"].is_null());
    assert!(new["rank1"].is_null());
    assert_eq!(new["status"], "new");
    assert_eq!(new["significantDecline"], false);
    assert_eq!(json["kpis"]["newDomains"], 1);
}

// ============================================================
// BDD: Missing fields fall back to defaults
// ============================================================
#[tokio::test]
async fn test_dashboard_defaults_to_latest_date_and_conversions() {
    let app = setup().await;
    let response = app
        .oneshot(post_json("/api/dashboard-data", json!({})))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["filters"]["metric"], "Conversions");
    assert_eq!(json["filters"]["date"], "2026-03-14");
    assert_eq!(json["filters"]["topN"], 10);
    assert_eq!(json["filters"]["advertiser"], "All Advertisers");
    assert_eq!(json["weekRanges"]["week1"]["start"], "2026-03-01");
    assert_eq!(json["weekRanges"]["week1"]["end"], "2026-03-07");
    assert_eq!(json["weekRanges"]["week2"]["start"], "2026-03-08");
}

// ============================================================
// BDD: Anchor too early for two full weeks is rejected
// ============================================================
#[tokio::test]
async fn test_dashboard_rejects_insufficient_history() {
    let app = setup().await;
    let response = app
        .oneshot(post_json(
            "/api/dashboard-data",
            json!({"date": "2026-03-13"}),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "insufficient_history");
    assert_eq!(json["error"]["field"], "date");
    assert!(json["error"]["message"]
        .as_str()
        .expect("message")
        .contains("2026-03-14"));
}

// ============================================================
// BDD: Dates at the edge of the calendar are a 400, not a crash
// ============================================================
#[tokio::test]
async fn test_dashboard_rejects_extreme_date() {
    let app = setup().await;
    let response = app
        .oneshot(post_json(
            "/api/dashboard-data",
            json!({"date": "-262143-01-03"}),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "insufficient_history");
}

// ============================================================
// BDD: Unknown metric is rejected
// ============================================================
#[tokio::test]
async fn test_dashboard_rejects_unknown_metric() {
    let app = setup().await;
    let response = app
        .oneshot(post_json(
            "/api/dashboard-data",
            json!({"metric": "Revenue"}),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "unknown_metric");
}

// ============================================================
// BDD: Out-of-range topN and malformed bodies are validation errors
// ============================================================
#[tokio::test]
async fn test_dashboard_rejects_invalid_input() {
    let app = setup().await;
    let response = app
        .clone()
        .oneshot(post_json("/api/dashboard-data", json!({"topN": 0})))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "validation_error");

    let response = app
        .clone()
        .oneshot(post_json("/api/dashboard-data", json!({"date": "14/03/2026"})))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "validation_error");

    let malformed = Request::builder()
        .method("POST")
        .uri("/api/dashboard-data")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .expect("build request");
    let response = app.oneshot(malformed).await.expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "validation_error");
}

// ============================================================
// BDD: Identical requests produce identical bytes
// ============================================================
#[tokio::test]
async fn test_dashboard_is_idempotent() {
    let app = setup().await;
    let body = json!({"topN": 2, "date": "2026-03-14", "sortBy": "changePct", "sortDir": "asc"});
    let mut payloads = Vec::new();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_json("/api/dashboard-data", body.clone()))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::OK);
        payloads.push(
            response
                .into_body()
                .collect()
                .await
                .expect("read body")
                .to_bytes(),
        );
    }
    assert_eq!(payloads[0], payloads[1]);
}

// ============================================================
// BDD: No snapshot means 503 no_data
// ============================================================
#[tokio::test]
async fn test_dashboard_without_data_returns_503() {
    let state = Arc::new(AppState::new(
        test_config(),
        Arc::new(StaticSource::new(vec![])),
        RecordStore::empty(),
    ));
    let app = build_app(state);
    let response = app
        .oneshot(post_json("/api/dashboard-data", json!({})))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["error"]["code"], "no_data");
}
