use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::json;

use super::*;
use crate::cookie_store::{CookieStore, MemoryCookieStore, SESSION_COOKIE, SESSION_TTL_DAYS};
use crate::error::FailureKind;
use crate::test_support::{client, spawn_backend};

fn category(name: &str, product: &str) -> Category {
    Category { id: None, sr_no: None, role: "Buyer".to_owned(), category: name.to_owned(), product: product.to_owned(), popular: true }
}

// =============================================================================
// Page::from_body
// =============================================================================

#[test]
fn page_from_paginated_envelope() {
    let body = json!({
        "data": [{ "id": 1, "srNo": 1, "role": "Buyer", "category": "Clothes", "product": "Jeans", "popular": true }],
        "pagination": { "total": 31, "totalPages": 4, "currentPage": 2 }
    });
    let page = Page::<Category>::from_body(body, PageRequest::new(2, 10)).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, Some(RecordId::Number(1)));
    assert_eq!(page.items[0].sr_no, Some(1));
    assert_eq!((page.total, page.total_pages, page.current_page), (31, 4, 2));
}

#[test]
fn page_from_short_bare_array_is_last_page() {
    let body = json!([{ "category": "Mobile", "product": "iPhone" }, { "category": "Laptop", "product": "Dell" }]);
    let page = Page::<Category>::from_body(body, PageRequest::new(3, 10)).unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!((page.total, page.total_pages, page.current_page), (22, 3, 3));
}

#[test]
fn page_from_full_bare_array_assumes_more() {
    let body = Value::Array((0..5).map(|i| json!({ "id": format!("c{i}") })).collect());
    let page = Page::<Category>::from_body(body, PageRequest::new(1, 5)).unwrap();
    assert_eq!(page.items[0].id, Some(RecordId::Text("c0".to_owned())));
    assert_eq!((page.total, page.total_pages), (5, 2));
}

#[test]
fn page_from_unexpected_shape_is_protocol_failure() {
    let err = Page::<Category>::from_body(json!({ "items": [] }), PageRequest::default()).unwrap_err();
    assert!(matches!(err, ApiError::MissingField("data")));
    assert_eq!(err.kind(), FailureKind::Protocol);

    let err = Page::<Category>::from_body(json!("nope"), PageRequest::default()).unwrap_err();
    assert!(matches!(err, ApiError::MissingField("data")));
}

#[test]
fn page_request_clamps_to_one() {
    assert_eq!(PageRequest::new(0, 0), PageRequest { page: 1, limit: 1 });
}

// =============================================================================
// validation
// =============================================================================

#[test]
fn category_requires_category_and_product() {
    assert_eq!(category("", "Jeans").validate(), Err(ValidationError::Required("category")));
    assert_eq!(category("Clothes", " ").validate(), Err(ValidationError::Required("product")));
    assert!(category("Clothes", "Jeans").validate().is_ok());
}

#[test]
fn rating_must_be_in_range() {
    let rating = Rating { id: None, sr_no: None, categories: "Jeans".to_owned(), shop: "Clothes".to_owned(), rating: 5.5, review: true };
    assert_eq!(rating.validate(), Err(ValidationError::RatingOutOfRange));
    assert!(Rating { rating: 4.5, ..rating }.validate().is_ok());
}

#[test]
fn location_policy_report_required_fields() {
    let location = Location { id: None, sr_no: None, role: String::new(), location: "London".to_owned(), region: String::new(), popular: false };
    assert_eq!(location.validate(), Err(ValidationError::Required("region")));

    let policy = LegalPolicy { id: None, question: "How do I book a service?".to_owned(), answer: String::new() };
    assert_eq!(policy.validate(), Err(ValidationError::Required("answer")));

    let report = Report { id: None, title: String::new(), content: "Lorem".to_owned() };
    assert_eq!(report.validate(), Err(ValidationError::Required("title")));
}

#[test]
fn record_id_parses_numbers_and_text() {
    assert_eq!(RecordId::from("42"), RecordId::Number(42));
    assert_eq!(RecordId::from("abc"), RecordId::Text("abc".to_owned()));
    assert_eq!(RecordId::Number(7).to_string(), "7");
}

#[test]
fn serializes_camel_case_without_empty_ids() {
    let json = serde_json::to_value(Category { sr_no: Some(3), ..category("Clothes", "Jeans") }).unwrap();
    assert_eq!(json, json!({ "srNo": 3, "role": "Buyer", "category": "Clothes", "product": "Jeans", "popular": true }));
}

// =============================================================================
// operations against a fake backend
// =============================================================================

fn backend(posts: Arc<AtomicUsize>) -> Router {
    Router::new()
        .route(
            "/categories",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "data": [{ "id": 1, "category": "Clothes", "product": "Jeans" }],
                    "pagination": {
                        "total": 1,
                        "totalPages": 1,
                        "currentPage": params.get("page").and_then(|p| p.parse::<u32>().ok()),
                    },
                    "echo": params,
                }))
            })
            .post(move |Json(body): Json<Value>| {
                posts.fetch_add(1, Ordering::SeqCst);
                async move { (StatusCode::CREATED, Json(json!({ "id": 9, "created": body }))) }
            }),
        )
        .route(
            "/categories/{id}",
            delete(|Path(id): Path<String>| async move { Json(json!({ "deleted": id })) })
                .put(|Path(id): Path<String>, Json(body): Json<Value>| async move { Json(json!({ "id": id, "updated": body })) }),
        )
        .route(
            "/reports",
            get(|| async { Json(json!([{ "id": 1, "title": "Company Overview", "content": "Lorem" }])) }),
        )
        .route("/ratings", get(|| async { (StatusCode::FORBIDDEN, Json(json!({ "message": "Access denied" }))) }))
}

async fn api_with_backend() -> (ApiClient, Arc<MemoryCookieStore>, Arc<AtomicUsize>) {
    let posts = Arc::new(AtomicUsize::new(0));
    let base = spawn_backend(backend(posts.clone())).await;
    let store = Arc::new(MemoryCookieStore::new());
    store.write(SESSION_COOKIE, "abc123", SESSION_TTL_DAYS);
    (client(&base, store.clone()), store, posts)
}

#[tokio::test]
async fn list_sends_page_and_limit() {
    let (api, _, _) = api_with_backend().await;
    let page = api.list::<Category>(PageRequest::new(2, 25)).await.unwrap();
    assert_eq!(page.items[0].category, "Clothes");
    assert_eq!(page.current_page, 2);
}

#[tokio::test]
async fn list_all_accepts_bare_array() {
    let (api, _, _) = api_with_backend().await;
    let reports = api.list_all::<Report>().await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].title, "Company Overview");
}

#[tokio::test]
async fn create_posts_valid_record() {
    let (api, _, posts) = api_with_backend().await;
    let created = api.create(&category("Clothes", "Jeans")).await.unwrap();
    assert_eq!(created["id"], 9);
    assert_eq!(created["created"]["product"], "Jeans");
    assert_eq!(posts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn create_rejects_invalid_record_without_request() {
    let (api, _, posts) = api_with_backend().await;
    let err = api.create(&category("Clothes", "")).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Validation);
    assert_eq!(posts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn update_and_delete_target_record_path() {
    let (api, _, _) = api_with_backend().await;
    let id = RecordId::from("7");

    let updated = api.update(&id, &category("Mobile", "iPhone")).await.unwrap();
    assert_eq!(updated["id"], "7");
    assert_eq!(updated["updated"]["category"], "Mobile");

    let deleted = api.delete::<Category>(&id).await.unwrap();
    assert_eq!(deleted["deleted"], "7");
}

#[tokio::test]
async fn forbidden_list_purges_credential() {
    let (api, store, _) = api_with_backend().await;
    let err = api.list::<Rating>(PageRequest::default()).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Authorization);
    assert_eq!(err.user_message("Failed to load ratings."), "Access denied");
    assert_eq!(store.read(SESSION_COOKIE), None);
}
