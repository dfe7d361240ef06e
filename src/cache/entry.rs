//! Cache Entry Module
//!
//! A stored query result together with the instant it was computed.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A single cached value and its insertion time.
///
/// Ages are measured with `tokio::time::Instant`, so a paused test runtime
/// can move time forward without sleeping.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Key the entry is stored under
    pub key: String,
    /// The cached payload
    pub value: V,
    /// When the value was produced
    pub inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry stamped with `inserted_at`.
    pub fn new(key: impl Into<String>, value: V, inserted_at: Instant) -> Self {
        Self {
            key: key.into(),
            value,
            inserted_at,
        }
    }

    // == Age ==
    /// Time elapsed between insertion and `now`. Saturates at zero.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.inserted_at)
    }

    // == Is Fresh ==
    /// An entry is fresh while its age is at most `ttl`.
    ///
    /// The boundary is inclusive: at exactly `ttl` the entry may still be
    /// served, one tick later it may not.
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        self.age(now) <= ttl
    }
}
