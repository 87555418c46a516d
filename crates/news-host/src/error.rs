//! Error types for the news host.

use thiserror::Error;

/// Host error type.
#[derive(Error, Debug)]
pub enum HostError {
    /// Store failure; the submission was not acknowledged.
    #[error("Storage error: {0}")]
    Database(#[from] news_database::DatabaseError),

    /// Forwarder failure
    #[error("Outbox error: {0}")]
    Outbox(#[from] news_outbox::OutboxError),

    /// Transport or remote failure
    #[error("RPC error: {0}")]
    Rpc(#[from] news_rpc::RpcError),

    /// Background task failure
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for host operations.
pub type HostResult<T> = Result<T, HostError>;
