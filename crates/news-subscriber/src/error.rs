//! Error types for the subscriber.

use thiserror::Error;

/// Subscriber error type.
#[derive(Error, Debug)]
pub enum SubscriberError {
    /// Socket error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Registration call failed
    #[error("Registration failed: {0}")]
    Registration(#[from] news_rpc::RpcError),

    /// Publisher answered but did not register us
    #[error("Publisher refused registration of {0}")]
    Refused(std::net::SocketAddr),

    /// Configured advertise address is not usable
    #[error("Invalid advertise address: {0}")]
    InvalidAddress(String),
}

/// Result type alias for subscriber operations.
pub type SubscriberResult<T> = Result<T, SubscriberError>;
