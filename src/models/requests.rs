//! Request DTOs for the stock price API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::cache::MAX_KEY_LENGTH;

/// Request body for adding a favourite (POST /api/favourites)
#[derive(Debug, Clone, Deserialize)]
pub struct FavouriteRequest {
    /// Stock name as it appears in `SC_NAME`
    pub name: String,
}

impl FavouriteRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_stock_name(&self.name)
    }
}

/// Checks a stock name received from a path segment or request body.
///
/// Returns an error message if the name is unusable, None if valid.
pub fn validate_stock_name(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return Some("Stock name cannot be empty".to_string());
    }
    // Leave room for the cache key prefix
    if name.len() > MAX_KEY_LENGTH - 16 {
        return Some(format!(
            "Stock name exceeds maximum length of {} characters",
            MAX_KEY_LENGTH - 16
        ));
    }
    if name.chars().any(char::is_control) {
        return Some("Stock name contains control characters".to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favourite_request_deserialize() {
        let req: FavouriteRequest = serde_json::from_str(r#"{"name": "RELIANCE"}"#).unwrap();
        assert_eq!(req.name, "RELIANCE");
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_validate_empty_name() {
        let req = FavouriteRequest {
            name: "   ".to_string(),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_long_and_control_names() {
        assert!(validate_stock_name(&"X".repeat(MAX_KEY_LENGTH)).is_some());
        assert!(validate_stock_name("TATA\tSTEEL").is_some());
        assert!(validate_stock_name("TATA STEEL").is_none());
    }
}
