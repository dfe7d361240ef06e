//! Cache Store Module
//!
//! Synchronous map of entries with LRU tracking and TTL checks. The
//! read-through layer wraps it in a mutex; nothing here awaits.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStats, LruTracker};

// == Cache Store ==
/// Bounded key -> entry map with a fixed TTL.
#[derive(Debug)]
pub struct CacheStore<V> {
    entries: HashMap<String, CacheEntry<V>>,
    lru: LruTracker,
    stats: CacheStats,
    max_entries: usize,
    ttl: Duration,
    /// Bumped by every invalidation
    epoch: u64,
    /// Invalidation epoch per key, kept only while computations run
    invalidated: HashMap<String, u64>,
    computing: usize,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` values for `ttl` each.
    ///
    /// A capacity of zero is raised to one so a computed value can always
    /// be stored.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: HashMap::with_capacity(max_entries.min(4096)),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries,
            ttl,
            epoch: 0,
            invalidated: HashMap::new(),
            computing: 0,
        }
    }

    // == Get ==
    /// Returns the value for `key` if it is fresh at `now`.
    ///
    /// A hit marks the key most recently used. An expired entry is removed
    /// and reported as a miss.
    pub fn get(&mut self, key: &str, now: Instant) -> Option<V> {
        let value = self.fresh_value(key, now);
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    // == Peek ==
    /// Like [`get`](Self::get) but leaves the hit/miss counters alone.
    pub fn peek(&mut self, key: &str, now: Instant) -> Option<V> {
        self.fresh_value(key, now)
    }

    fn fresh_value(&mut self, key: &str, now: Instant) -> Option<V> {
        let entry = self.entries.get(key)?;
        if entry.is_fresh(self.ttl, now) {
            let value = entry.value.clone();
            self.lru.touch(key);
            return Some(value);
        }

        self.remove(key);
        self.stats.record_expirations(1);
        None
    }

    // == Insert ==
    /// Stores `value` under `key` stamped with `now`, replacing any previous
    /// entry for the key.
    ///
    /// When a new key arrives at capacity the least recently used entry is
    /// evicted first; its key is returned.
    pub fn insert(&mut self, key: &str, value: V, now: Instant) -> Option<String> {
        let mut evicted = None;
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            if let Some(oldest) = self.lru.evict_oldest() {
                self.entries.remove(&oldest);
                self.stats.record_eviction();
                evicted = Some(oldest);
            }
        }

        self.entries
            .insert(key.to_string(), CacheEntry::new(key, value, now));
        self.lru.touch(key);
        self.stats.set_total_entries(self.entries.len());
        evicted
    }

    // == Remove ==
    /// Drops the entry for `key`. Returns whether one existed.
    pub fn remove(&mut self, key: &str) -> bool {
        let existed = self.entries.remove(key).is_some();
        if existed {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        existed
    }

    // == Invalidate ==
    /// Drops the entry for `key` and keeps computations already running
    /// from storing a value for it.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.epoch += 1;
        if self.computing > 0 {
            self.invalidated.insert(key.to_string(), self.epoch);
        }
        self.remove(key)
    }

    // == Compute Tracking ==
    /// Registers a running computation. Returns the epoch it started in.
    pub fn begin_compute(&mut self) -> u64 {
        self.computing += 1;
        self.epoch
    }

    pub fn end_compute(&mut self) {
        self.computing = self.computing.saturating_sub(1);
        if self.computing == 0 {
            self.invalidated.clear();
        }
    }

    /// Whether `key` was invalidated after a computation began at `started`.
    pub fn invalidated_since(&self, key: &str, started: u64) -> bool {
        self.invalidated
            .get(key)
            .is_some_and(|&epoch| epoch > started)
    }

    // == Purge Expired ==
    /// Removes every entry that is stale at `now` and returns how many.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let ttl = self.ttl;
        let expired: Vec<String> = self
            .entries
            .values()
            .filter(|entry| !entry.is_fresh(ttl, now))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_expirations(expired.len());
        self.stats.set_total_entries(self.entries.len());
        expired.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.set_total_entries(0);
    }

    pub fn record_compute_failure(&mut self) {
        self.stats.record_compute_failure();
    }

    pub fn record_coalesced(&mut self) {
        self.stats.record_coalesced();
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
