//! Error types for linnet-core.
//!
//! Per-item failures inside batched operations are collected rather than
//! propagated; see [`crate::Response`] for how they reach the caller.

use thiserror::Error;

/// Linnet error types.
#[derive(Error, Debug)]
pub enum Error {
    /// The request is missing a required identifier or carries a malformed payload.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No live root node could be resolved.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A conditional put found an item with the same key.
    #[error("Item already exists: {0}")]
    ConditionalCheckFailed(String),

    /// The store signalled back-pressure.
    #[error("Throughput exceeded: {0}")]
    Throughput(String),

    /// Any other failure reported by the store client.
    #[error("Store error: {0}")]
    Store(String),

    /// Marshalling between records and store attributes failed.
    #[error("Internal error: {0}")]
    Internal(String),

    /// The request uses a feature that has no implementation.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// A pagination cursor could not be decoded.
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true when the failure is transient and the request may be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throughput(_))
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Self::InvalidCursor(err.to_string())
    }
}

/// Result type alias for linnet operations.
pub type Result<T> = std::result::Result<T, Error>;
