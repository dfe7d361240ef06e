//! Cache Module
//!
//! In-memory read-through caching with TTL expiry and LRU eviction.

mod entry;
mod keys;
mod lru;
mod read_through;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use keys::{is_valid_key, CacheKey};
pub use lru::LruTracker;
pub use read_through::ReadThroughCache;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
