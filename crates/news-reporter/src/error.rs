//! Error types for the reporter.

use thiserror::Error;

/// Reporter error type.
#[derive(Error, Debug)]
pub enum ReporterError {
    /// Blank source or headline
    #[error("Invalid input: {0}")]
    Invalid(#[from] news_protocol::ProtocolError),

    /// The host could not be reached or answered with an error
    #[error("RPC error: {0}")]
    Rpc(#[from] news_rpc::RpcError),

    /// The host answered but did not accept the item
    #[error("Host did not accept the item")]
    NotAccepted,

    /// Console read or write failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for reporter operations.
pub type ReporterResult<T> = Result<T, ReporterError>;
