//! API Module
//!
//! HTTP handlers and routing for the stock price REST API.
//!
//! # Endpoints
//! - `GET /` - Ping test
//! - `GET /api/top-stocks` - Top 10 stocks by closing price
//! - `GET /api/stock/:name` - Records for one stock
//! - `GET /api/stock/history/:name` - Price history for one stock
//! - `GET|POST /api/favourites`, `DELETE /api/favourites/:name` - Favourites
//! - `GET /api/cache/stats` - Cache statistics

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
