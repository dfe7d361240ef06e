//! Integration Tests for API Endpoints
//!
//! Drives the full router against the in-memory store and checks both the
//! response bodies and what the cache served.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use stock_price_api::{
    api::create_router, db::MemoryStockStore, models::Stock, AppState, ReadThroughCache,
};
use tokio_test::assert_ok;
use tower::ServiceExt;

const TTL: Duration = Duration::from_secs(300);

// == Helper Functions ==

fn stock(name: &str, close: f64, date: &str) -> Stock {
    Stock {
        sc_code: 500000,
        sc_name: name.to_string(),
        sc_group: "A".to_string(),
        sc_type: "Q".to_string(),
        open: close - 5.0,
        high: close + 10.0,
        low: close - 10.0,
        close,
        last: close,
        prev_close: close - 1.0,
        no_trades: 100,
        no_of_shares: 1000,
        net_turnover: close * 1000.0,
        date: date.to_string(),
    }
}

fn seeded_store() -> Arc<MemoryStockStore> {
    let mut records = vec![
        stock("RELIANCE", 2500.0, "10/01/24"),
        stock("RELIANCE", 2450.0, "09/01/24"),
        stock("HDFC BANK", 1650.0, "09/01/24"),
    ];
    for i in 0..12 {
        records.push(stock(&format!("SMALLCAP{}", i), 10.0 + i as f64, "09/01/24"));
    }
    Arc::new(MemoryStockStore::with_records(records))
}

fn create_test_app(store: Arc<MemoryStockStore>) -> Router {
    let cache = ReadThroughCache::new(100, TTL, true);
    create_router(AppState::new(cache, store))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    assert_ok!(app.clone().oneshot(builder.body(body).unwrap()).await)
}

async fn get(app: &Router, uri: &str) -> Response {
    send(app, "GET", uri, None).await
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn stats(app: &Router) -> Value {
    body_to_json(get(app, "/api/cache/stats").await.into_body()).await
}

// == Ping ==

#[tokio::test]
async fn test_ping() {
    let app = create_test_app(seeded_store());

    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Server is up and running.");
    assert_eq!(json["status"], 200);
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_ping_store_offline() {
    let store = seeded_store();
    store.set_offline(true);
    let app = create_test_app(store);

    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// == Top Stocks ==

#[tokio::test]
async fn test_top_stocks_sorted_and_limited() {
    let app = create_test_app(seeded_store());

    let response = get(&app, "/api/top-stocks").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 10);
    assert_eq!(data[0]["SC_NAME"], "RELIANCE");
    assert_eq!(data[0]["CLOSE"], 2500.0);
    assert_eq!(
        json["message"],
        "Top 10 stocks data has been fetched (sorted by CLOSED value)"
    );
}

#[tokio::test]
async fn test_top_stocks_served_from_cache() {
    let store = seeded_store();
    let app = create_test_app(store.clone());

    assert_eq!(get(&app, "/api/top-stocks").await.status(), StatusCode::OK);

    // A hit never reaches the store
    store.set_offline(true);
    let response = get(&app, "/api/top-stocks").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = stats(&app).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["total_entries"], 1);
}

#[tokio::test(start_paused = true)]
async fn test_top_stocks_recomputed_after_ttl() {
    let store = seeded_store();
    let app = create_test_app(store.clone());

    assert_eq!(get(&app, "/api/top-stocks").await.status(), StatusCode::OK);
    store.set_offline(true);

    tokio::time::advance(TTL).await;
    assert_eq!(get(&app, "/api/top-stocks").await.status(), StatusCode::OK);

    tokio::time::advance(Duration::from_secs(1)).await;
    let response = get(&app, "/api/top-stocks").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = stats(&app).await;
    assert_eq!(json["expirations"], 1);
    assert_eq!(json["compute_failures"], 1);
    assert_eq!(json["total_entries"], 0);
}

#[tokio::test]
async fn test_failed_lookup_is_not_cached() {
    let store = seeded_store();
    store.set_offline(true);
    let app = create_test_app(store.clone());

    assert_eq!(
        get(&app, "/api/top-stocks").await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );

    store.set_offline(false);
    assert_eq!(get(&app, "/api/top-stocks").await.status(), StatusCode::OK);
}

// == Stock Records ==

#[tokio::test]
async fn test_stock_found() {
    let app = create_test_app(seeded_store());

    let response = get(&app, "/api/stock/RELIANCE").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["message"], "Fetched stock data of name: RELIANCE");
    assert_eq!(json["status"], 200);
}

#[tokio::test]
async fn test_stock_name_with_space() {
    let app = create_test_app(seeded_store());

    let response = get(&app, "/api/stock/HDFC%20BANK").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["data"][0]["SC_NAME"], "HDFC BANK");
}

#[tokio::test]
async fn test_stock_not_found() {
    let app = create_test_app(seeded_store());

    let response = get(&app, "/api/stock/UNKNOWN").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["data"], Value::Array(Vec::new()));
    assert_eq!(json["message"], "No stock data available for: UNKNOWN");
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_blank_stock_name_rejected() {
    let app = create_test_app(seeded_store());

    let response = get(&app, "/api/stock/%20%20").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].is_string());

    // Nothing was looked up or cached
    let json = stats(&app).await;
    assert_eq!(json["misses"], 0);
    assert_eq!(json["total_entries"], 0);
}

// == Stock History ==

#[tokio::test]
async fn test_history_in_trading_day_order() {
    let app = create_test_app(seeded_store());

    let response = get(&app, "/api/stock/history/RELIANCE").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["date"], "09/01/24");
    assert_eq!(data[1]["date"], "10/01/24");
    assert_eq!(data[1]["CLOSE"], 2500.0);
    assert!(data[0].get("SC_NAME").is_none());
}

#[tokio::test]
async fn test_history_not_found() {
    let app = create_test_app(seeded_store());

    let response = get(&app, "/api/stock/history/UNKNOWN").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "No history available for stock: UNKNOWN");
}

#[tokio::test]
async fn test_stock_and_history_cached_separately() {
    let app = create_test_app(seeded_store());

    get(&app, "/api/stock/RELIANCE").await;
    let response = get(&app, "/api/stock/history/RELIANCE").await;

    // The history lookup must not be answered with snapshot records
    let json = body_to_json(response.into_body()).await;
    assert!(json["data"][0].get("SC_CODE").is_none());

    let json = stats(&app).await;
    assert_eq!(json["misses"], 2);
    assert_eq!(json["total_entries"], 2);
}

// == Favourites ==

#[tokio::test]
async fn test_favourites_lifecycle() {
    let app = create_test_app(seeded_store());

    let response = get(&app, "/api/favourites").await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["data"], Value::Array(Vec::new()));

    let response = send(&app, "POST", "/api/favourites", Some(r#"{"name":" TCS "}"#)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["name"], "TCS");
    assert_eq!(json["status"], 201);

    // The write dropped the cached empty listing
    let response = get(&app, "/api/favourites").await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["data"][0]["SC_NAME"], "TCS");
    assert_eq!(json["message"], "Fetched 1 favourite stocks");

    let response = send(&app, "DELETE", "/api/favourites/TCS", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/api/favourites").await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["data"], Value::Array(Vec::new()));
}

#[tokio::test]
async fn test_remove_unknown_favourite() {
    let app = create_test_app(seeded_store());

    let response = send(&app, "DELETE", "/api/favourites/NOPE", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_favourite_blank_name() {
    let app = create_test_app(seeded_store());

    let response = send(&app, "POST", "/api/favourites", Some(r#"{"name":"   "}"#)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_favourite_invalid_json() {
    let app = create_test_app(seeded_store());

    let response = send(&app, "POST", "/api/favourites", Some("not json")).await;
    assert!(response.status().is_client_error());
}

// == Cache Stats ==

#[tokio::test]
async fn test_cache_stats_initial() {
    let app = create_test_app(seeded_store());

    let json = stats(&app).await;
    assert_eq!(json["hits"], 0);
    assert_eq!(json["misses"], 0);
    assert_eq!(json["evictions"], 0);
    assert_eq!(json["hit_rate"], 0.0);
    assert_eq!(json["max_entries"], 100);
    assert_eq!(json["ttl_secs"], 300);
}

#[tokio::test]
async fn test_capacity_eviction_through_api() {
    let store = seeded_store();
    let app = create_router(AppState::new(ReadThroughCache::new(2, TTL, true), store));

    get(&app, "/api/stock/RELIANCE").await;
    get(&app, "/api/stock/HDFC%20BANK").await;
    get(&app, "/api/stock/RELIANCE").await;
    get(&app, "/api/stock/SMALLCAP1").await;

    let json = stats(&app).await;
    assert_eq!(json["evictions"], 1);
    assert_eq!(json["total_entries"], 2);

    // HDFC BANK was least recently used, RELIANCE survived
    get(&app, "/api/stock/RELIANCE").await;
    let json = stats(&app).await;
    assert_eq!(json["hits"], 2);
}

// == Routing ==

#[tokio::test]
async fn test_unknown_route() {
    let app = create_test_app(seeded_store());

    let response = get(&app, "/api/nonexistent").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
