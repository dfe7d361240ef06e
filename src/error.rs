//! Error types for the stock price API
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Failure of a read-through lookup.
///
/// `E` is the caller's own error type; a failed computation is handed back
/// untouched through [`CacheError::ComputeFailed`]. Tasks that waited on the
/// same computation receive clones of it.
#[derive(Error, Debug)]
pub enum CacheError<E> {
    /// Key is empty, over-long or contains control characters
    #[error("Invalid cache key: {0:?}")]
    InvalidKey(String),

    /// The data-producing operation failed; nothing was cached
    #[error("{0}")]
    ComputeFailed(E),
}

// == Store Error Enum ==
/// Failure talking to the stock record store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Query or connection error from PostgreSQL
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store cannot serve requests
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

// == Ingest Error Enum ==
/// Failure while downloading or loading one bhavcopy.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Date argument is not a real `dd/mm/yyyy` date
    #[error("{0} is not a valid date in the dd/mm/yyyy format")]
    InvalidDate(String),

    /// Exchange answered with a non-success status
    #[error("Bhavcopy for {date} not available (HTTP {status})")]
    NotPublished { date: String, status: u16 },

    /// Network failure fetching the archive
    #[error("Download failed: {0}")]
    Download(#[from] reqwest::Error),

    /// Response was not a readable ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Archive did not contain the expected CSV
    #[error("Archive did not contain {0}")]
    MissingCsv(String),

    /// Malformed CSV row
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Reading or writing the data directory failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Inserting the records failed
    #[error("Unable to add records in database: {0}")]
    Store(#[from] StoreError),

    /// Blocking extraction or parse task panicked
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// == API Error Enum ==
/// Unified error type for the HTTP layer.
///
/// Cloneable so one failed store query can answer every request that was
/// waiting on it.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// Malformed request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Record store failure
    #[error("Unable to fetch records: {0}")]
    Store(#[source] Arc<StoreError>),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(Arc::new(err))
    }
}

impl From<CacheError<ApiError>> for ApiError {
    fn from(err: CacheError<ApiError>) -> Self {
        match err {
            CacheError::InvalidKey(key) => {
                ApiError::InvalidRequest(format!("Invalid cache key: {:?}", key))
            }
            CacheError::ComputeFailed(inner) => inner,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(err) if matches!(**err, StoreError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP layer.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
