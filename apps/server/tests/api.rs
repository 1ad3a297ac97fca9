use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::Value;
use stockdice_core::RecordStore;
use stockdice_market_data::{
    CompanyProfile, Dataset, ForexPair, ForexQuote, Record, SymbolListing,
};
use stockdice_server::{api::app_router, build_state, config::Config, AppState};
use stockdice_storage_sqlite::{spawn_writer, RecordRepository};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

async fn build_test_state() -> (TempDir, Arc<AppState>) {
    let tmp = tempdir().unwrap();
    let vars: HashMap<&str, String> = HashMap::from([
        (
            "SD_DB_PATH",
            tmp.path().join("test.sqlite").to_string_lossy().to_string(),
        ),
        ("SD_REFRESH_ENABLED", "false".to_string()),
    ]);
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    let state = build_state(&config).await.unwrap();
    (tmp, state)
}

fn profile(symbol: &str, currency: &str, market_cap: f64) -> Record {
    Record::CompanyProfile(CompanyProfile {
        symbol: symbol.to_string(),
        company_name: Some(format!("{} Corp", symbol)),
        currency: Some(currency.to_string()),
        market_cap: Some(market_cap),
        is_etf: Some(false),
        is_fund: Some(false),
        ..Default::default()
    })
}

async fn seed(state: &AppState, profiles: Vec<Record>) {
    let repository = RecordRepository::new(state.pool.clone(), spawn_writer((*state.pool).clone()));
    repository
        .upsert_forex_pairs(vec![ForexPair {
            symbol: "EURUSD".to_string(),
            from_currency: Some("EUR".to_string()),
            to_currency: Some("USD".to_string()),
            ..Default::default()
        }])
        .await
        .unwrap();
    repository
        .upsert(
            Dataset::Forex,
            vec![Record::ForexQuote(ForexQuote {
                symbol: "EURUSD".to_string(),
                price: Some(2.0),
            })],
            1,
        )
        .await
        .unwrap();
    let listings = profiles
        .iter()
        .map(|profile| {
            Record::Symbol(SymbolListing {
                symbol: profile.symbol().to_string(),
                ..Default::default()
            })
        })
        .collect();
    repository.upsert(Dataset::Symbols, listings, 1).await.unwrap();
    repository
        .upsert(Dataset::CompanyProfile, profiles, 1)
        .await
        .unwrap();
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (_tmp, state) = build_test_state().await;

    let (status, body) = get(app_router(state), "/api/v1/healthz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn roll_returns_requested_number_of_samples() {
    let (_tmp, state) = build_test_state().await;
    seed(&state, vec![profile("AAA", "USD", 10.0), profile("BBB", "EUR", 15.0)]).await;

    let (status, body) = get(app_router(state), "/api/v1/roll?n=5&weighting=market-cap").await;

    assert_eq!(status, StatusCode::OK);
    let rolls = body.as_array().unwrap();
    assert_eq!(rolls.len(), 5);
    for roll in rolls {
        match roll["symbol"].as_str().unwrap() {
            "AAA" => assert_eq!(roll["marketCapUsd"], 10.0),
            "BBB" => {
                assert_eq!(roll["marketCapUsd"], 30.0);
                assert_eq!(roll["companyName"], "BBB Corp");
            }
            other => panic!("unexpected symbol {}", other),
        }
    }
}

#[tokio::test]
async fn roll_defaults_to_one_sample() {
    let (_tmp, state) = build_test_state().await;
    seed(&state, vec![profile("AAA", "USD", 10.0)]).await;

    let (status, body) = get(app_router(state), "/api/v1/roll").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn roll_of_zero_is_empty_even_without_universe() {
    let (_tmp, state) = build_test_state().await;

    let (status, body) = get(app_router(state), "/api/v1/roll?n=0").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(vec![]));
}

#[tokio::test]
async fn roll_on_empty_universe_is_conflict() {
    let (_tmp, state) = build_test_state().await;

    let (status, body) = get(app_router(state), "/api/v1/roll?n=3").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "EMPTY_UNIVERSE");
}

#[tokio::test]
async fn roll_with_unmapped_currency_is_unprocessable() {
    let (_tmp, state) = build_test_state().await;
    seed(&state, vec![profile("AAA", "USD", 10.0), profile("ZZZ", "XXX", 5.0)]).await;

    let (status, body) = get(app_router(state), "/api/v1/roll?n=1&weighting=uniform").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "CURRENCY_LOOKUP");
}

#[tokio::test]
async fn roll_rejects_unknown_weighting() {
    let (_tmp, state) = build_test_state().await;

    let (status, body) = get(app_router(state), "/api/v1/roll?weighting=loaded").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ARGUMENT");
}
