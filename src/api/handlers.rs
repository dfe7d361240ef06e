//! API Handlers
//!
//! HTTP request handlers for each stock price endpoint. Every read goes
//! through the shared read-through cache under a key derived from the
//! request.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::cache::{CacheKey, ReadThroughCache};
use crate::db::StockStore;
use crate::error::{ApiError, Result};
use crate::models::{
    history_of, validate_stock_name, CacheStatsResponse, Favourite, FavouriteRequest,
    FavouriteResponse, FavouritesResponse, PingResponse, Stock, StockDataResponse, StockHistory,
    StockHistoryResponse, TopStocksResponse, TOP_STOCKS_LIMIT,
};

// == Cached Query ==
/// A cached query result. Each [`CacheKey`] namespace always holds the
/// same variant.
#[derive(Debug, Clone)]
pub enum CachedQuery {
    Stocks(Arc<Vec<Stock>>),
    History(Arc<Vec<StockHistory>>),
    Favourites(Arc<Vec<Favourite>>),
}

impl CachedQuery {
    fn into_stocks(self) -> Result<Arc<Vec<Stock>>> {
        match self {
            CachedQuery::Stocks(rows) => Ok(rows),
            other => Err(mismatch("stocks", &other)),
        }
    }

    fn into_history(self) -> Result<Arc<Vec<StockHistory>>> {
        match self {
            CachedQuery::History(points) => Ok(points),
            other => Err(mismatch("history", &other)),
        }
    }

    fn into_favourites(self) -> Result<Arc<Vec<Favourite>>> {
        match self {
            CachedQuery::Favourites(favourites) => Ok(favourites),
            other => Err(mismatch("favourites", &other)),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            CachedQuery::Stocks(_) => "stocks",
            CachedQuery::History(_) => "history",
            CachedQuery::Favourites(_) => "favourites",
        }
    }
}

fn mismatch(expected: &str, found: &CachedQuery) -> ApiError {
    ApiError::Internal(format!(
        "cached value holds {} where {} was expected",
        found.kind(),
        expected
    ))
}

/// Application state shared across all handlers.
///
/// Built once in `main` and handed to the router; handlers never reach
/// for a global cache.
#[derive(Clone)]
pub struct AppState {
    /// Query result cache
    pub cache: Arc<ReadThroughCache<CachedQuery>>,
    /// Record store the cache reads through to
    pub store: Arc<dyn StockStore>,
}

impl AppState {
    /// Creates a new AppState with the given cache and store.
    pub fn new(cache: ReadThroughCache<CachedQuery>, store: Arc<dyn StockStore>) -> Self {
        Self {
            cache: Arc::new(cache),
            store,
        }
    }

    /// Creates a new AppState with a cache sized from configuration.
    pub fn from_config(config: &crate::config::Config, store: Arc<dyn StockStore>) -> Self {
        Self::new(ReadThroughCache::from_config(config), store)
    }
}

/// Trims a path or body stock name and rejects unusable ones.
fn stock_name(raw: &str) -> Result<String> {
    if let Some(error_msg) = validate_stock_name(raw) {
        return Err(ApiError::InvalidRequest(error_msg));
    }
    Ok(raw.trim().to_string())
}

/// Handler for GET /
///
/// Reports that the server is up and the store answers.
pub async fn ping_handler(State(state): State<AppState>) -> Result<Json<PingResponse>> {
    state.store.ping().await?;
    Ok(Json(PingResponse::up()))
}

/// Handler for GET /api/top-stocks
///
/// Returns the ten records with the highest closing price.
pub async fn top_stocks_handler(State(state): State<AppState>) -> Result<Json<TopStocksResponse>> {
    let store = Arc::clone(&state.store);
    let cached = state
        .cache
        .get_or_compute(CacheKey::top_stocks().as_str(), || async move {
            let rows = store.top_by_close(TOP_STOCKS_LIMIT).await?;
            Ok::<_, ApiError>(CachedQuery::Stocks(Arc::new(rows)))
        })
        .await?;

    let rows = cached.into_stocks()?;
    Ok(Json(TopStocksResponse::top(rows.as_ref().clone())))
}

/// Handler for GET /api/stock/:name
///
/// Returns every record for the stock. An unknown name answers HTTP 404
/// with the usual body (`data: []`, `status: 404`); the transport status
/// always matches the body's `status` field.
pub async fn stock_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<StockDataResponse>)> {
    let name = stock_name(&name)?;
    let key = CacheKey::stock(&name);

    let store = Arc::clone(&state.store);
    let lookup = name.clone();
    let cached = state
        .cache
        .get_or_compute(key.as_str(), || async move {
            let rows = store.find_by_name(&lookup).await?;
            Ok::<_, ApiError>(CachedQuery::Stocks(Arc::new(rows)))
        })
        .await?;

    let response = StockDataResponse::for_stock(&name, cached.into_stocks()?.as_ref().clone());
    Ok((response.status_code(), Json(response)))
}

/// Handler for GET /api/stock/history/:name
///
/// Returns the stock's OHLC points in trading-day order. An unknown name
/// answers HTTP 404 with `data: []` and `status: 404` in the body.
pub async fn stock_history_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<StockHistoryResponse>)> {
    let name = stock_name(&name)?;
    let key = CacheKey::history(&name);

    let store = Arc::clone(&state.store);
    let lookup = name.clone();
    let cached = state
        .cache
        .get_or_compute(key.as_str(), || async move {
            let rows = store.find_by_name(&lookup).await?;
            Ok::<_, ApiError>(CachedQuery::History(Arc::new(history_of(&rows))))
        })
        .await?;

    let response =
        StockHistoryResponse::for_stock(&name, cached.into_history()?.as_ref().clone());
    Ok((response.status_code(), Json(response)))
}

/// Handler for GET /api/favourites
pub async fn list_favourites_handler(
    State(state): State<AppState>,
) -> Result<Json<FavouritesResponse>> {
    let store = Arc::clone(&state.store);
    let cached = state
        .cache
        .get_or_compute(CacheKey::favourites().as_str(), || async move {
            let favourites = store.favourites().await?;
            Ok::<_, ApiError>(CachedQuery::Favourites(Arc::new(favourites)))
        })
        .await?;

    let favourites = cached.into_favourites()?;
    Ok(Json(FavouritesResponse::list(favourites.as_ref().clone())))
}

/// Handler for POST /api/favourites
///
/// Adds a favourite and drops the cached listing.
pub async fn add_favourite_handler(
    State(state): State<AppState>,
    Json(req): Json<FavouriteRequest>,
) -> Result<(StatusCode, Json<FavouriteResponse>)> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }
    let name = req.name.trim();

    let favourite = state.store.add_favourite(name).await?;
    state.cache.invalidate(CacheKey::favourites().as_str());
    info!(name = %favourite.sc_name, "Favourite added");

    Ok((
        StatusCode::CREATED,
        Json(FavouriteResponse::added(favourite.sc_name)),
    ))
}

/// Handler for DELETE /api/favourites/:name
pub async fn remove_favourite_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<FavouriteResponse>> {
    let name = stock_name(&name)?;

    if !state.store.remove_favourite(&name).await? {
        return Err(ApiError::NotFound(format!("'{}' is not a favourite", name)));
    }
    state.cache.invalidate(CacheKey::favourites().as_str());
    info!(name = %name, "Favourite removed");

    Ok(Json(FavouriteResponse::removed(name)))
}

/// Handler for GET /api/cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let cache = &state.cache;
    Json(CacheStatsResponse::new(
        cache.stats(),
        cache.max_entries(),
        cache.ttl().as_secs(),
    ))
}
