//! Protocol error types.

use thiserror::Error;

/// Protocol error type.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// News payload could not be decoded into a (source, headline) pair.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Method parameters were missing or had the wrong shape.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using ProtocolError.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
