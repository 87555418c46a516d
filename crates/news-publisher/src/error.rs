//! Error types for the publisher.

use thiserror::Error;

/// Publisher error type.
#[derive(Error, Debug)]
pub enum PublisherError {
    /// Socket error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RPC server error
    #[error("RPC error: {0}")]
    Rpc(#[from] news_rpc::RpcError),

    /// Item could not be encoded for fan-out
    #[error("Encoding error: {0}")]
    Protocol(#[from] news_protocol::ProtocolError),
}

/// Result type alias for publisher operations.
pub type PublisherResult<T> = Result<T, PublisherError>;
