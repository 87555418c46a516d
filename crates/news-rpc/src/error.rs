//! RPC error types.

use std::time::Duration;
use thiserror::Error;

/// RPC error type.
#[derive(Error, Debug)]
pub enum RpcError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload or parameter decoding error
    #[error("Protocol error: {0}")]
    Protocol(#[from] news_protocol::ProtocolError),

    /// Could not reach the remote endpoint
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// No connection or answer within the deadline
    #[error("{stage} timed out after {after:?}")]
    Timeout { stage: &'static str, after: Duration },

    /// Connection closed before a response arrived
    #[error("Connection closed")]
    ConnectionClosed,

    /// Method not found on the remote side
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// The remote side answered with an error response
    #[error("Remote error {code}: {message}")]
    Remote { code: i32, message: String },
}

impl RpcError {
    /// Whether the failure happened in the transport rather than in the
    /// remote handler.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Connect { .. } | Self::Timeout { .. } | Self::ConnectionClosed
        )
    }
}

/// Result type alias using RpcError.
pub type RpcResult<T> = Result<T, RpcError>;
