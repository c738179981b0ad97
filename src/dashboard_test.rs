use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use super::*;
use crate::cookie_store::MemoryCookieStore;
use crate::error::FailureKind;
use crate::test_support::{client, spawn_backend};

#[test]
fn summary_keeps_unknown_fields() {
    let summary: DashboardSummary = serde_json::from_value(json!({
        "categories": [{ "role": "Buyer", "category": "Clothes", "product": "Jeans" }],
        "legalPolicies": ["How do I book a service?"],
        "rating": { "positive": 50, "negative": 50 },
        "activeUsers": 12
    }))
    .unwrap();

    assert_eq!(summary.categories.len(), 1);
    assert!(summary.locations.is_empty());
    assert_eq!(summary.legal_policies, vec!["How do I book a service?".to_owned()]);
    assert_eq!(summary.rating, Some(RatingSplit { positive: 50.0, negative: 50.0 }));
    assert_eq!(summary.extra.get("activeUsers"), Some(&json!(12)));
}

#[test]
fn search_results_shapes() {
    assert_eq!(search_results(json!(["a", "b"])).unwrap().len(), 2);
    assert_eq!(search_results(json!({ "results": ["a"] })).unwrap(), vec![json!("a")]);
    assert_eq!(search_results(json!({ "data": [1, 2, 3] })).unwrap().len(), 3);
    assert!(search_results(Value::Null).unwrap().is_empty());
    assert!(matches!(search_results(json!({ "hits": [] })), Err(ApiError::MissingField("results"))));
}

fn backend() -> Router {
    Router::new()
        .route(
            "/search",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let q = params.get("q").cloned().unwrap_or_default();
                Json(json!([format!("{q} repair"), format!("{q} store")]))
            }),
        )
        .route("/dashboard", get(|| async { Json(json!({ "report": "Quarterly summary" })) }))
}

#[tokio::test]
async fn search_sends_trimmed_query() {
    let base = spawn_backend(backend()).await;
    let api = client(&base, Arc::new(MemoryCookieStore::new()));

    let results = api.search("  shoes ").await.unwrap();
    assert_eq!(results, vec![json!("shoes repair"), json!("shoes store")]);
}

#[tokio::test]
async fn blank_search_is_validation_failure() {
    let api = client("http://127.0.0.1:9/api", Arc::new(MemoryCookieStore::new()));
    let err = api.search("   ").await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Validation);
}

#[tokio::test]
async fn dashboard_decodes_summary() {
    let base = spawn_backend(backend()).await;
    let api = client(&base, Arc::new(MemoryCookieStore::new()));

    let summary = api.dashboard().await.unwrap();
    assert_eq!(summary.report.as_deref(), Some("Quarterly summary"));
    assert!(summary.categories.is_empty());
}
