//! Storage error types.

use std::time::Duration;
use thiserror::Error;

/// Persistence errors.
///
/// These never tear down the in-memory ledger; they tell the caller that the
/// latest state may not be durable.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ledger file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Operation did not finish in time
    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),

    /// Stored value cannot be represented
    #[error("Malformed stored value: {0}")]
    Malformed(String),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
