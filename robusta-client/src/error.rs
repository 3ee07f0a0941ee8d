//! Client error types

use thiserror::Error;

pub use crate::engine::TransitionError;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input failed client-side checks; no backend call was made
    #[error("validation error: {0}")]
    Validation(String),

    /// The status engine rejected the requested change
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Network or server failure during a store mutation or fetch
    #[error("backend error: {0}")]
    Backend(String),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A table side effect targeted a reference that no longer resolves
    #[error("table {0} no longer resolves")]
    MissingTable(i64),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Authentication required
    #[error("authentication required")]
    Unauthorized,

    /// Realtime channel lost or never established
    #[error("channel disconnected: {0}")]
    Channel(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
