//! In-memory stock store.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::db::StockStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{Favourite, Stock};

/// Keeps every record in process memory.
///
/// The store can be switched offline to exercise failure paths.
#[derive(Debug, Default)]
pub struct MemoryStockStore {
    records: RwLock<Vec<Stock>>,
    favourites: RwLock<Vec<Favourite>>,
    offline: RwLock<bool>,
}

impl MemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with `records`.
    pub fn with_records(records: Vec<Stock>) -> Self {
        Self {
            records: RwLock::new(records),
            ..Self::default()
        }
    }

    /// While offline every operation fails with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        *self.offline.write() = offline;
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn check_online(&self) -> StoreResult<()> {
        if *self.offline.read() {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StockStore for MemoryStockStore {
    async fn ping(&self) -> StoreResult<()> {
        self.check_online()
    }

    async fn top_by_close(&self, limit: usize) -> StoreResult<Vec<Stock>> {
        self.check_online()?;
        let mut sorted = self.records.read().clone();
        sorted.sort_by(|a, b| b.close.total_cmp(&a.close));
        sorted.truncate(limit);
        Ok(sorted)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Vec<Stock>> {
        self.check_online()?;
        Ok(self
            .records
            .read()
            .iter()
            .filter(|stock| stock.sc_name == name)
            .cloned()
            .collect())
    }

    async fn insert_many(&self, records: &[Stock]) -> StoreResult<u64> {
        self.check_online()?;
        self.records.write().extend_from_slice(records);
        Ok(records.len() as u64)
    }

    async fn favourites(&self) -> StoreResult<Vec<Favourite>> {
        self.check_online()?;
        Ok(self.favourites.read().clone())
    }

    async fn add_favourite(&self, name: &str) -> StoreResult<Favourite> {
        self.check_online()?;
        let mut favourites = self.favourites.write();
        if let Some(existing) = favourites.iter().find(|fav| fav.sc_name == name) {
            return Ok(existing.clone());
        }
        let favourite = Favourite::new(name);
        favourites.push(favourite.clone());
        Ok(favourite)
    }

    async fn remove_favourite(&self, name: &str) -> StoreResult<bool> {
        self.check_online()?;
        let mut favourites = self.favourites.write();
        let before = favourites.len();
        favourites.retain(|fav| fav.sc_name != name);
        Ok(favourites.len() != before)
    }
}
