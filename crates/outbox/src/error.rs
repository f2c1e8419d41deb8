use thiserror::Error;

use crate::MessageId;

/// Errors that can occur when interacting with the outbox store.
///
/// Publish failures are not represented here: the relay turns them into
/// status transitions (retry, dead-letter) instead of propagating them.
#[derive(Debug, Error)]
pub enum OutboxError {
    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The referenced message does not exist in the store.
    #[error("outbox message not found: {0}")]
    MessageNotFound(MessageId),
}

/// Result type for outbox operations.
pub type Result<T> = std::result::Result<T, OutboxError>;
