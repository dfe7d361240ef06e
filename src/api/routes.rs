//! API Routes
//!
//! Configures the Axum router with all stock price endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_favourite_handler, cache_stats_handler, list_favourites_handler, ping_handler,
    remove_favourite_handler, stock_handler, stock_history_handler, top_stocks_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Ping test
/// - `GET /api/top-stocks` - Top 10 stocks by closing price
/// - `GET /api/stock/:name` - Records for one stock (404 when unknown)
/// - `GET /api/stock/history/:name` - Price history for one stock (404 when unknown)
/// - `GET /api/favourites` - List favourites
/// - `POST /api/favourites` - Add a favourite
/// - `DELETE /api/favourites/:name` - Remove a favourite
/// - `GET /api/cache/stats` - Cache statistics
///
/// Every query body carries a `status` field equal to the HTTP status, so
/// an unknown stock is a real 404 rather than a 200 with `status: 404`.
///
/// # Middleware
/// - CORS: Allows any origin, method and header
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/top-stocks", get(top_stocks_handler))
        .route("/stock/history/:name", get(stock_history_handler))
        .route("/stock/:name", get(stock_handler))
        .route(
            "/favourites",
            get(list_favourites_handler).post(add_favourite_handler),
        )
        .route("/favourites/:name", delete(remove_favourite_handler))
        .route("/cache/stats", get(cache_stats_handler));

    Router::new()
        .route("/", get(ping_handler))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ReadThroughCache;
    use crate::db::MemoryStockStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let cache = ReadThroughCache::new(100, Duration::from_secs(300), true);
        let state = AppState::new(cache, Arc::new(MemoryStockStore::new()));
        create_router(state)
    }

    async fn status_of(uri: &str) -> StatusCode {
        create_test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_ping_endpoint() {
        assert_eq!(status_of("/").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_top_stocks_endpoint() {
        assert_eq!(status_of("/api/top-stocks").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_history_route_not_shadowed_by_stock_route() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/stock/history/RELIANCE")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // An empty store answers 404 from the history handler, not from routing
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["message"], "No history available for stock: RELIANCE");
    }

    #[tokio::test]
    async fn test_cache_stats_endpoint() {
        assert_eq!(status_of("/api/cache/stats").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        assert_eq!(status_of("/api/nope").await, StatusCode::NOT_FOUND);
    }
}
