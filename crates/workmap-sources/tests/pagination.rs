mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::{json, Value};
use workmap_core::WorkmapError;
use workmap_sources::page::{fetch_all_pages, get_json};

#[derive(Clone)]
struct PageFixture {
    total: usize,
    requests: Arc<AtomicUsize>,
}

async fn items(
    State(fixture): State<PageFixture>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    fixture.requests.fetch_add(1, Ordering::SeqCst);

    let page: usize = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    let per_page: usize = params
        .get("per_page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(100);

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(fixture.total);
    let batch: Vec<Value> = (start..end.max(start)).map(|n| json!({ "id": n })).collect();
    Json(Value::Array(batch))
}

fn paged_router(total: usize, requests: Arc<AtomicUsize>) -> Router {
    Router::new()
        .route("/items", get(items))
        .with_state(PageFixture { total, requests })
}

#[derive(Debug, Deserialize)]
struct Item {
    id: usize,
}

#[tokio::test]
async fn concatenates_pages_until_a_short_page() {
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);
    let fixture = common::start(move |_| paged_router(337, counter)).await;

    let client = reqwest::Client::new();
    let url = format!("{}/items", fixture.base);
    let all: Vec<Item> = fetch_all_pages(&client, &url, &HeaderMap::new(), &[], 100)
        .await
        .expect("fetch all pages");

    // Pages of 100, 100, 100, 37: the 37-item page ends the walk.
    assert_eq!(all.len(), 337);
    assert_eq!(requests.load(Ordering::SeqCst), 4);

    // Nothing duplicated, nothing dropped.
    let ids: std::collections::HashSet<usize> = all.iter().map(|i| i.id).collect();
    assert_eq!(ids.len(), 337);
}

#[tokio::test]
async fn exactly_full_final_page_costs_one_empty_request() {
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);
    let fixture = common::start(move |_| paged_router(200, counter)).await;

    let client = reqwest::Client::new();
    let url = format!("{}/items", fixture.base);
    let all: Vec<Item> = fetch_all_pages(&client, &url, &HeaderMap::new(), &[], 100)
        .await
        .expect("fetch all pages");

    // 200 items at page size 100: two full pages plus the empty page that
    // terminates the walk.
    assert_eq!(all.len(), 200);
    assert_eq!(requests.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn non_success_status_fails_with_the_url_attached() {
    let fixture = common::start(|_| {
        Router::new().route(
            "/missing",
            get(|| async { axum::http::StatusCode::NOT_FOUND }),
        )
    })
    .await;

    let client = reqwest::Client::new();
    let url = format!("{}/missing", fixture.base);
    let err = get_json::<Item>(&client, &url, HeaderMap::new(), &[])
        .await
        .unwrap_err();

    match err {
        WorkmapError::HttpStatus { status, url: tagged } => {
            assert_eq!(status, 404);
            assert!(tagged.contains("/missing"));
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn non_array_body_is_a_decode_error() {
    let fixture = common::start(|_| {
        Router::new().route(
            "/odd",
            get(|| async { Json(json!({ "not": "an array" })) }),
        )
    })
    .await;

    let client = reqwest::Client::new();
    let url = format!("{}/odd", fixture.base);
    let err = get_json::<Item>(&client, &url, HeaderMap::new(), &[])
        .await
        .unwrap_err();

    assert!(matches!(err, WorkmapError::Decode { .. }));
}
