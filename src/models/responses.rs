//! Response DTOs for the stock price API
//!
//! Defines the structure of outgoing HTTP response bodies.

use axum::http::StatusCode;
use serde::Serialize;

use crate::cache::CacheStats;
use crate::models::{Favourite, Stock, StockHistory};

/// Envelope shared by every record query: `{ data, message, status }`.
///
/// `status` mirrors the HTTP status code of the response.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse<T> {
    pub data: Vec<T>,
    pub message: String,
    pub status: u16,
}

impl<T> QueryResponse<T> {
    pub fn new(data: Vec<T>, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            data,
            message: message.into(),
            status: status.as_u16(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK)
    }
}

/// Response body for GET /api/top-stocks
pub type TopStocksResponse = QueryResponse<Stock>;

/// Response body for GET /api/stock/:name
pub type StockDataResponse = QueryResponse<Stock>;

/// Response body for GET /api/stock/history/:name
pub type StockHistoryResponse = QueryResponse<StockHistory>;

/// Response body for GET /api/favourites
pub type FavouritesResponse = QueryResponse<Favourite>;

impl TopStocksResponse {
    pub fn top(data: Vec<Stock>) -> Self {
        Self::new(
            data,
            "Top 10 stocks data has been fetched (sorted by CLOSED value)",
            StatusCode::OK,
        )
    }

    /// Snapshot records for `name`; 404 when there are none.
    pub fn for_stock(name: &str, data: Vec<Stock>) -> Self {
        if data.is_empty() {
            Self::new(
                data,
                format!("No stock data available for: {}", name),
                StatusCode::NOT_FOUND,
            )
        } else {
            Self::new(
                data,
                format!("Fetched stock data of name: {}", name),
                StatusCode::OK,
            )
        }
    }
}

impl StockHistoryResponse {
    /// History points for `name`; 404 when there are none.
    pub fn for_stock(name: &str, data: Vec<StockHistory>) -> Self {
        if data.is_empty() {
            Self::new(
                data,
                format!("No history available for stock: {}", name),
                StatusCode::NOT_FOUND,
            )
        } else {
            Self::new(
                data,
                format!("Fetched history of stock: {}", name),
                StatusCode::OK,
            )
        }
    }
}

impl FavouritesResponse {
    pub fn list(data: Vec<Favourite>) -> Self {
        let message = format!("Fetched {} favourite stocks", data.len());
        Self::new(data, message, StatusCode::OK)
    }
}

/// Response body for favourite writes (POST/DELETE /api/favourites)
#[derive(Debug, Clone, Serialize)]
pub struct FavouriteResponse {
    pub message: String,
    pub name: String,
    pub status: u16,
}

impl FavouriteResponse {
    pub fn added(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            message: format!("Added '{}' to favourites", name),
            name,
            status: StatusCode::CREATED.as_u16(),
        }
    }

    pub fn removed(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            message: format!("Removed '{}' from favourites", name),
            name,
            status: StatusCode::OK.as_u16(),
        }
    }
}

/// Response body for the ping route (GET /)
#[derive(Debug, Clone, Serialize)]
pub struct PingResponse {
    pub message: String,
    pub status: u16,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl PingResponse {
    pub fn up() -> Self {
        Self {
            message: "Server is up and running.".to_string(),
            status: StatusCode::OK.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for GET /api/cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Share of lookups served without computing
    pub hit_rate: f64,
    pub max_entries: usize,
    pub ttl_secs: u64,
}

impl CacheStatsResponse {
    pub fn new(stats: CacheStats, max_entries: usize, ttl_secs: u64) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
            max_entries,
            ttl_secs,
        }
    }
}
