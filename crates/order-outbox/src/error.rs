//! Outbox error types.

use std::time::Duration;
use thiserror::Error;

/// Outbox error type.
#[derive(Error, Debug)]
pub enum OutboxError {
    /// The order handed to `submit` is not a JSON object.
    #[error("Invalid order: {0}")]
    InvalidInput(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The send did not complete in time.
    #[error("Send timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Transport could not be used at all.
    #[error("Transmission failed: {0}")]
    Transmission(String),

    /// Envelope exceeded its retry budget and was dropped.
    #[error("Max retries exceeded for envelope {id} after {attempts} attempts")]
    RetryBudgetExhausted { id: String, attempts: u32 },

    /// Storage read/write error
    #[error("Persistence error: {0}")]
    Persistence(#[from] mieza_kv_store::StoreError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OutboxError {
    /// Whether this error is a routine network failure that feeds the retry loop.
    pub fn is_transmission(&self) -> bool {
        matches!(
            self,
            OutboxError::Http(_) | OutboxError::Timeout(_) | OutboxError::Transmission(_)
        )
    }
}

/// Result type alias using OutboxError.
pub type OutboxResult<T> = Result<T, OutboxError>;
