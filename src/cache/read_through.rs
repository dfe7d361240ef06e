//! Read-Through Cache Module
//!
//! `get_or_compute` in front of a [`CacheStore`]. The store mutex is held
//! only for map reads and writes, never while a computation runs.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::{is_valid_key, CacheStats, CacheStore};
use crate::error::CacheError;

/// Leader's error, handed to followers that call with the same error type.
type SharedError = Arc<dyn Any + Send + Sync>;

/// What a leader publishes to the tasks waiting on it.
#[derive(Debug, Clone)]
enum FlightOutcome {
    Pending,
    /// The value is in the store
    Stored,
    /// Computed but not stored, the key was invalidated meanwhile
    Discarded,
    Failed(SharedError),
}

#[derive(Debug)]
struct InFlight {
    id: u64,
    outcome: watch::Receiver<FlightOutcome>,
}

#[derive(Debug, Default)]
struct FlightRegistry {
    next_id: u64,
    flights: HashMap<String, InFlight>,
}

enum Role<'a, V: Clone> {
    Leader(Flight<'a, V>),
    Follower(watch::Receiver<FlightOutcome>),
    Ready(V),
}

// == Read-Through Cache ==
/// Process-wide TTL cache shared by request handlers.
///
/// With single-flight enabled, concurrent misses on one key are collapsed:
/// the first task computes while later ones wait for its outcome, then
/// read the stored value or return the same error. Misses on different
/// keys never wait on each other.
#[derive(Debug)]
pub struct ReadThroughCache<V> {
    store: Mutex<CacheStore<V>>,
    in_flight: Mutex<FlightRegistry>,
    single_flight: bool,
}

impl<V: Clone> ReadThroughCache<V> {
    // == Constructor ==
    /// Creates a cache holding at most `max_entries` values for `ttl` each.
    pub fn new(max_entries: usize, ttl: Duration, single_flight: bool) -> Self {
        Self {
            store: Mutex::new(CacheStore::new(max_entries, ttl)),
            in_flight: Mutex::new(FlightRegistry::default()),
            single_flight,
        }
    }

    /// Creates a cache from the application configuration.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(
            config.cache_max_entries,
            Duration::from_secs(config.cache_ttl_secs),
            config.cache_single_flight,
        )
    }

    // == Get Or Compute ==
    /// Returns the fresh value for `key`, or runs `compute`, stores its
    /// output and returns it.
    ///
    /// A failing `compute` is returned as [`CacheError::ComputeFailed`]
    /// carrying the original error, and leaves the cache as it was. Tasks
    /// that were waiting on that computation get a clone of the error.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &str,
        compute: F,
    ) -> Result<V, CacheError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: Clone + Send + Sync + 'static,
    {
        if !is_valid_key(key) {
            return Err(CacheError::InvalidKey(key.to_string()));
        }

        let cached = self.store.lock().get(key, Instant::now());
        if let Some(value) = cached {
            debug!(key, "Cache hit");
            return Ok(value);
        }

        if !self.single_flight {
            return self
                .compute_and_store(key, compute)
                .await
                .map(|(value, _)| value)
                .map_err(CacheError::ComputeFailed);
        }

        loop {
            match self.join_flight(key) {
                Role::Ready(value) => {
                    self.store.lock().record_coalesced();
                    debug!(key, "Cache hit after waiting on in-flight computation");
                    return Ok(value);
                }
                Role::Leader(flight) => return self.lead(flight, key, compute).await,
                Role::Follower(outcome) => {
                    if let FlightOutcome::Failed(err) = wait_for_leader(outcome).await {
                        // A caller with another error type computes for itself
                        if let Some(err) = err.downcast_ref::<E>() {
                            debug!(key, "In-flight computation failed");
                            return Err(CacheError::ComputeFailed(err.clone()));
                        }
                    }
                    // Stored values are picked up as Ready on the next pass
                }
            }
        }
    }

    async fn lead<F, Fut, E>(
        &self,
        flight: Flight<'_, V>,
        key: &str,
        compute: F,
    ) -> Result<V, CacheError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: Clone + Send + Sync + 'static,
    {
        match self.compute_and_store(key, compute).await {
            Ok((value, stored)) => {
                let outcome = if stored {
                    FlightOutcome::Stored
                } else {
                    FlightOutcome::Discarded
                };
                flight.finish(outcome);
                Ok(value)
            }
            Err(err) => {
                flight.finish(FlightOutcome::Failed(Arc::new(err.clone())));
                Err(CacheError::ComputeFailed(err))
            }
        }
    }

    /// Runs `compute` and stores a successful value unless `key` was
    /// invalidated while it ran. Returns the value and whether it was stored.
    async fn compute_and_store<F, Fut, E>(&self, key: &str, compute: F) -> Result<(V, bool), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        debug!(key, "Cache miss, computing");
        let ticket = ComputeTicket::begin(self);

        let result = match compute().await {
            Ok(value) => {
                let stored = {
                    let mut store = self.store.lock();
                    if store.invalidated_since(key, ticket.started) {
                        None
                    } else {
                        Some(store.insert(key, value.clone(), Instant::now()))
                    }
                };
                match &stored {
                    Some(Some(evicted)) => {
                        debug!(key, evicted = %evicted, "Evicted least recently used entry");
                    }
                    Some(None) => {}
                    None => debug!(key, "Invalidated during computation, result not cached"),
                }
                Ok((value, stored.is_some()))
            }
            Err(err) => {
                self.store.lock().record_compute_failure();
                warn!(key, "Computation failed, nothing cached");
                Err(err)
            }
        };

        drop(ticket);
        result
    }

    /// Follows the computation in flight for `key`, or registers as its
    /// leader. Returns the value directly if a leader stored it meanwhile.
    fn join_flight<'a>(&'a self, key: &'a str) -> Role<'a, V> {
        let mut registry = self.in_flight.lock();
        if let Some(flight) = registry.flights.get(key) {
            return Role::Follower(flight.outcome.clone());
        }

        let stored = self.store.lock().peek(key, Instant::now());
        if let Some(value) = stored {
            return Role::Ready(value);
        }

        let (sender, receiver) = watch::channel(FlightOutcome::Pending);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.flights.insert(
            key.to_string(),
            InFlight {
                id,
                outcome: receiver,
            },
        );

        Role::Leader(Flight {
            cache: self,
            key,
            id,
            outcome: sender,
        })
    }

    fn leave_flight(&self, key: &str, id: u64) {
        let mut registry = self.in_flight.lock();
        if registry.flights.get(key).is_some_and(|flight| flight.id == id) {
            registry.flights.remove(key);
        }
    }

    // == Invalidate ==
    /// Drops the cached value for `key` so the next lookup recomputes.
    ///
    /// A computation for `key` already running keeps its result out of
    /// the cache.
    pub fn invalidate(&self, key: &str) -> bool {
        self.store.lock().invalidate(key)
    }

    // == Purge Expired ==
    /// Removes every entry older than the TTL and returns how many.
    pub fn purge_expired(&self) -> usize {
        self.store.lock().purge_expired(Instant::now())
    }

    pub fn clear(&self) {
        self.store.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.store.lock().ttl()
    }

    pub fn max_entries(&self) -> usize {
        self.store.lock().max_entries()
    }

    /// Number of keys that currently have a computation in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().flights.len()
    }
}

/// Waits until the leader publishes. `Pending` means it went away first.
async fn wait_for_leader(mut outcome: watch::Receiver<FlightOutcome>) -> FlightOutcome {
    loop {
        let current = outcome.borrow_and_update().clone();
        if !matches!(current, FlightOutcome::Pending) {
            return current;
        }
        if outcome.changed().await.is_err() {
            let last = outcome.borrow().clone();
            return last;
        }
    }
}

// == Flight ==
/// Leadership of one key's in-flight computation.
///
/// Dropping it (including when the owning future is cancelled) unregisters
/// the flight; waiting tasks then start over.
struct Flight<'a, V: Clone> {
    cache: &'a ReadThroughCache<V>,
    key: &'a str,
    id: u64,
    outcome: watch::Sender<FlightOutcome>,
}

impl<V: Clone> Flight<'_, V> {
    /// Unregisters, then wakes the followers. Lookups arriving after this
    /// never see the outcome.
    fn finish(self, outcome: FlightOutcome) {
        self.cache.leave_flight(self.key, self.id);
        let _ = self.outcome.send(outcome);
    }
}

impl<V: Clone> Drop for Flight<'_, V> {
    fn drop(&mut self) {
        self.cache.leave_flight(self.key, self.id);
    }
}

/// Marks a computation as running so invalidations during it are kept.
struct ComputeTicket<'a, V: Clone> {
    cache: &'a ReadThroughCache<V>,
    started: u64,
}

impl<'a, V: Clone> ComputeTicket<'a, V> {
    fn begin(cache: &'a ReadThroughCache<V>) -> Self {
        let started = cache.store.lock().begin_compute();
        Self { cache, started }
    }
}

impl<V: Clone> Drop for ComputeTicket<'_, V> {
    fn drop(&mut self) {
        self.cache.store.lock().end_compute();
    }
}
