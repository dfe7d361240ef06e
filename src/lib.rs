//! Stock Price API - Bombay Stock Exchange price records over HTTP
//!
//! Serves bhavcopy records through a TTL read-through cache with LRU
//! eviction, and ships the `bhavcopy` loader that fills the database.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod models;
pub mod tasks;

pub use api::{AppState, CachedQuery};
pub use cache::{CacheKey, ReadThroughCache};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
