//! Cache Statistics Module
//!
//! Counters describing how lookups were served.

use serde::Serialize;

// == Cache Stats ==
/// Read-through cache counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from a fresh entry
    pub hits: u64,
    /// Lookups that had to run the computation
    pub misses: u64,
    /// Entries removed to respect the capacity bound
    pub evictions: u64,
    /// Entries dropped because their age exceeded the TTL
    pub expirations: u64,
    /// Computations that returned an error (nothing was stored)
    pub compute_failures: u64,
    /// Lookups that waited on another task's in-flight computation
    /// and were answered by its result
    pub coalesced: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Share of lookups served without computing, coalesced waits included.
    ///
    /// Returns 0.0 when no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let served = self.hits + self.coalesced;
        let total = served + self.misses;
        if total == 0 {
            0.0
        } else {
            served as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Counts `count` entries dropped for age.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn record_compute_failure(&mut self) {
        self.compute_failures += 1;
    }

    /// A waiter found the value its leader stored; it was counted as a miss
    /// on arrival, so the miss is converted.
    pub fn record_coalesced(&mut self) {
        self.misses = self.misses.saturating_sub(1);
        self.coalesced += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_coalesced_converts_a_miss() {
        let mut stats = CacheStats::new();
        stats.record_miss();
        stats.record_miss();
        stats.record_coalesced();

        assert_eq!(stats.misses, 1);
        assert_eq!(stats.coalesced, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_record_expirations_and_failures() {
        let mut stats = CacheStats::new();
        stats.record_expirations(3);
        stats.record_expirations(0);
        stats.record_compute_failure();
        stats.record_eviction();

        assert_eq!(stats.expirations, 3);
        assert_eq!(stats.compute_failures, 1);
        assert_eq!(stats.evictions, 1);
    }
}
