//! Stock record storage
//!
//! The [`StockStore`] trait is the data-fetch side of every cached query.
//! Implementations:
//! - [`PgStockStore`] - PostgreSQL, used when `DATABASE_URL` is set
//! - [`MemoryStockStore`] - in-process, for development and tests

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{Favourite, Stock};

pub use memory::MemoryStockStore;
pub use postgres::PgStockStore;

/// Interface for stock record storage and retrieval.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Checks that the store can serve queries.
    async fn ping(&self) -> StoreResult<()>;

    /// Records sorted by closing price, highest first, at most `limit`.
    async fn top_by_close(&self, limit: usize) -> StoreResult<Vec<Stock>>;

    /// Every record whose `SC_NAME` equals `name`.
    async fn find_by_name(&self, name: &str) -> StoreResult<Vec<Stock>>;

    /// Bulk insert. Returns how many records were written.
    async fn insert_many(&self, records: &[Stock]) -> StoreResult<u64>;

    /// All favourites, oldest first.
    async fn favourites(&self) -> StoreResult<Vec<Favourite>>;

    /// Marks `name` as a favourite. Adding an existing favourite is a no-op.
    async fn add_favourite(&self, name: &str) -> StoreResult<Favourite>;

    /// Unmarks `name`. Returns whether it was a favourite.
    async fn remove_favourite(&self, name: &str) -> StoreResult<bool>;
}
