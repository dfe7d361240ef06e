//! TTL Cleanup Task
//!
//! Background task that periodically drops expired cache entries, so stale
//! per-stock results do not sit in memory until the next lookup or the
//! next capacity eviction.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ReadThroughCache;

/// Spawns a background task that purges expired entries every
/// `cleanup_interval_secs` seconds.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(ReadThroughCache::<String>::new(1000, Duration::from_secs(300), true));
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<V>(
    cache: Arc<ReadThroughCache<V>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()>
where
    V: Clone + Send + 'static,
{
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired();
            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    async fn seed(cache: &ReadThroughCache<String>, key: &str) {
        cache
            .get_or_compute(key, || async { Ok::<_, ()>("rows".to_string()) })
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = Arc::new(ReadThroughCache::new(100, TTL, true));
        seed(&cache, "stock:RELIANCE").await;

        let handle = spawn_cleanup_task(cache.clone(), 60);

        // Paused clock: sleeping auto-advances to the task's wakeups
        tokio::time::sleep(TTL + Duration::from_secs(61)).await;

        assert!(cache.is_empty(), "Expired entry should have been purged");
        assert_eq!(cache.stats().expirations, 1);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_preserves_fresh_entries() {
        let cache = Arc::new(ReadThroughCache::new(100, TTL, true));
        seed(&cache, "top_stocks").await;

        let handle = spawn_cleanup_task(cache.clone(), 60);
        tokio::time::sleep(Duration::from_secs(130)).await;

        assert_eq!(cache.len(), 1);
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let cache = Arc::new(ReadThroughCache::<String>::new(10, TTL, true));

        let handle = spawn_cleanup_task(cache, 1);
        handle.abort();

        let result = handle.await;
        assert!(result.unwrap_err().is_cancelled());
    }
}
