// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /market (contract keys, scope, AI gating, lang fallback)

mod common;

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use common::RecordingReportClient;
use mandi_market_engine::api::{self, AppState};
use mandi_market_engine::enrich::DynReportClient;
use mandi_market_engine::rates::providers::data_gov::DataGovProvider;
use mandi_market_engine::MarketEngine;

const BODY_LIMIT: usize = 1024 * 1024;

fn test_router(ai: DynReportClient) -> Router {
    let payload = fs::read_to_string("tests/fixtures/mandi_records.json")
        .expect("missing tests/fixtures/mandi_records.json");
    let rates = Arc::new(DataGovProvider::from_fixture_str(&payload, 50));
    let engine = MarketEngine::new(rates, ai, Duration::from_secs(5));
    api::router(AppState::new(engine))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, serde_json::from_slice(&bytes).expect("parse json"))
}

#[tokio::test]
async fn health_returns_ok() {
    let app = test_router(Arc::new(RecordingReportClient::answering("unused")));
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    assert_eq!(String::from_utf8_lossy(&bytes).trim(), "OK");
}

#[tokio::test]
async fn market_resolves_district_with_contract_keys() {
    let ai = Arc::new(RecordingReportClient::answering("Tomato up in Nashik."));
    let app = test_router(ai.clone());

    let (status, v) = get_json(
        app,
        "/market?location=Nashik%2C%20Maharashtra&commodity=tomato&lang=hi",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["resolvedScope"], "district");
    let records = v["records"].as_array().expect("records array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["market"], "Nashik");
    assert_eq!(records[0]["modalPrice"], "1200");
    assert!(records[0].get("arrivalDate").is_some());
    assert_eq!(v["report"]["narrativeText"], "Tomato up in Nashik.");
    assert_eq!(v["report"]["citations"][0]["url"], "https://agmarknet.gov.in");

    let reqs = ai.requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].language, mandi_market_engine::Language::Hi);
}

#[tokio::test]
async fn market_falls_back_to_state() {
    let app = test_router(Arc::new(RecordingReportClient::answering("ok")));

    let (_, v) = get_json(app, "/market?location=Haveli%2C%20Maharashtra&commodity=Tomato").await;

    assert_eq!(v["resolvedScope"], "state");
    assert_eq!(v["records"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn market_without_params_is_national_and_has_null_report() {
    let ai = Arc::new(RecordingReportClient::answering("unused"));
    let app = test_router(ai.clone());

    let (status, v) = get_json(app, "/market").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["resolvedScope"], "national");
    assert_eq!(v["records"].as_array().unwrap().len(), 6);
    assert!(v["report"].is_null());
    assert!(ai.requests().is_empty());
}

#[tokio::test]
async fn unknown_crop_in_known_state_resolves_none_with_empty_records() {
    let app = test_router(Arc::new(RecordingReportClient::failing()));

    let (status, v) = get_json(app, "/market?location=Punjab&commodity=Saffron&lang=xx").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["resolvedScope"], "none");
    assert!(v["records"].as_array().unwrap().is_empty());
    assert_eq!(
        v["report"]["narrativeText"],
        mandi_market_engine::enrich::FALLBACK_NARRATIVE
    );
}
