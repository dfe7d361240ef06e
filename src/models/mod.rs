//! Data models for the stock price API
//!
//! Stock records as stored, plus the DTOs used for serializing and
//! deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;
pub mod stock;

// Re-export commonly used types
pub use requests::{validate_stock_name, FavouriteRequest};
pub use responses::{
    CacheStatsResponse, FavouriteResponse, FavouritesResponse, PingResponse, QueryResponse,
    StockDataResponse, StockHistoryResponse, TopStocksResponse,
};
#[cfg(test)]
pub(crate) use stock::sample_stock;
pub use stock::{
    history_of, parse_trade_date, Favourite, Stock, StockHistory, TOP_STOCKS_LIMIT,
    TRADE_DATE_FORMAT,
};
