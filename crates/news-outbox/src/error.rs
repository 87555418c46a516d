//! Outbox error types.

use std::time::Duration;
use thiserror::Error;

/// Outbox error type.
#[derive(Error, Debug)]
pub enum OutboxError {
    /// Database error. Fatal for the forwarder.
    #[error("Database error: {0}")]
    Database(#[from] news_database::DatabaseError),

    /// Blocking store call did not complete.
    #[error("Store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Transport failure while delivering an entry.
    #[error("Send failed: {0}")]
    Send(String),

    /// The publisher answered but did not accept the entry.
    #[error("Publisher rejected entry {0}")]
    Rejected(u64),

    /// No answer within the configured deadline.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl OutboxError {
    /// Whether the forwarder must stop rather than retry.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Join(_))
    }
}

/// Result type alias using OutboxError.
pub type OutboxResult<T> = Result<T, OutboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_storage_errors_are_fatal() {
        let storage = OutboxError::Database(news_database::DatabaseError::Connection(
            "poisoned".to_string(),
        ));
        assert!(storage.is_fatal());
        assert!(!OutboxError::Send("refused".to_string()).is_fatal());
        assert!(!OutboxError::Rejected(3).is_fatal());
        assert!(!OutboxError::Timeout(Duration::from_secs(1)).is_fatal());
    }
}
