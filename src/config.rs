//! Configuration Module
//!
//! Loads server configuration from environment variables (and a `.env`
//! file, if present). Values are read once at startup.

use std::env;
use std::str::FromStr;

use tracing::warn;

/// Server configuration parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum number of cached query results
    pub cache_max_entries: usize,
    /// Freshness window of a cached result, in seconds
    pub cache_ttl_secs: u64,
    /// Collapse concurrent misses on the same key into one computation
    pub cache_single_flight: bool,
    /// Interval between expired-entry purges, in seconds
    pub cleanup_interval_secs: u64,
    /// HTTP server port
    pub server_port: u16,
    /// PostgreSQL connection string; the in-memory store is used when unset
    pub database_url: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CACHE_TTL_SECS` - Cache TTL in seconds (default: 300)
    /// - `CACHE_SINGLE_FLIGHT` - Deduplicate concurrent misses (default: true)
    /// - `CLEANUP_INTERVAL_SECS` - Expired-entry purge interval (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `DATABASE_URL` - PostgreSQL URL (default: unset)
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        let cache_max_entries: usize = parse_var("CACHE_MAX_ENTRIES", defaults.cache_max_entries);
        let cache_max_entries = if cache_max_entries == 0 {
            warn!("CACHE_MAX_ENTRIES must be at least 1, using 1");
            1
        } else {
            cache_max_entries
        };

        Self {
            cache_max_entries,
            cache_ttl_secs: parse_var("CACHE_TTL_SECS", defaults.cache_ttl_secs),
            cache_single_flight: parse_var("CACHE_SINGLE_FLIGHT", defaults.cache_single_flight),
            cleanup_interval_secs: parse_var("CLEANUP_INTERVAL_SECS", defaults.cleanup_interval_secs)
                .max(1),
            server_port: parse_var("SERVER_PORT", defaults.server_port),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_max_entries: 1000,
            cache_ttl_secs: 300,
            cache_single_flight: true,
            cleanup_interval_secs: 60,
            server_port: 8000,
            database_url: None,
        }
    }
}

/// Reads `name`, falling back to `default` when unset or unparseable.
fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %raw, "Ignoring unparseable value, using default");
            default
        }),
        Err(_) => default,
    }
}
