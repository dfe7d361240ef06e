//! Cache key derivation.
//!
//! Every logical query the API answers maps to exactly one key. Queries
//! over the same stock name live in separate namespaces, so a snapshot
//! lookup can never be answered with history rows and no stock name can
//! spell out another query's key.

use std::fmt;

use crate::cache::MAX_KEY_LENGTH;

const TOP_STOCKS: &str = "top_stocks";
const FAVOURITES: &str = "favourites";
const STOCK_PREFIX: &str = "stock:";
const HISTORY_PREFIX: &str = "history:";

// == Cache Key ==
/// A key for one cacheable query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// The parameterless top-stocks listing.
    pub fn top_stocks() -> Self {
        Self(TOP_STOCKS.to_string())
    }

    /// The parameterless favourites listing.
    pub fn favourites() -> Self {
        Self(FAVOURITES.to_string())
    }

    /// Snapshot records for one stock name.
    pub fn stock(name: &str) -> Self {
        Self(format!("{}{}", STOCK_PREFIX, name))
    }

    /// Price history for one stock name.
    pub fn history(name: &str) -> Self {
        Self(format!("{}{}", HISTORY_PREFIX, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Validation ==
/// A key is usable when it is non-blank, at most [`MAX_KEY_LENGTH`] bytes
/// and free of control characters.
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty() && key.len() <= MAX_KEY_LENGTH && !key.chars().any(char::is_control)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_and_history_keys_differ() {
        assert_ne!(CacheKey::stock("RELIANCE"), CacheKey::history("RELIANCE"));
        assert_eq!(CacheKey::stock("RELIANCE").as_str(), "stock:RELIANCE");
        assert_eq!(CacheKey::history("RELIANCE").as_str(), "history:RELIANCE");
    }

    #[test]
    fn test_stock_name_cannot_forge_fixed_keys() {
        assert_ne!(CacheKey::stock("top_stocks"), CacheKey::top_stocks());
        assert_ne!(CacheKey::stock("favourites"), CacheKey::favourites());
        assert_ne!(CacheKey::stock("x"), CacheKey::history("x"));
        // A name that embeds the other prefix still stays in its namespace
        assert_ne!(CacheKey::stock("history:x"), CacheKey::history("x"));
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("top_stocks"));
        assert!(is_valid_key("stock:TATA STEEL"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
        assert!(!is_valid_key("bad\nkey"));
        assert!(!is_valid_key(&"x".repeat(MAX_KEY_LENGTH + 1)));
        assert!(is_valid_key(&"x".repeat(MAX_KEY_LENGTH)));
    }
}
