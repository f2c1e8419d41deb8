use common::AggregateId;
use thiserror::Error;

/// Errors that can occur when interacting with the identity store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The email is already registered.
    ///
    /// Raised by the storage layer's unique index, which closes the race
    /// between the existence check and the write.
    #[error("the email address already exists")]
    DuplicateEmail,

    /// The user was not found.
    #[error("user not found: {0}")]
    UserNotFound(AggregateId),

    /// A stored record could not be rehydrated into an aggregate.
    #[error("invalid stored record: {0}")]
    InvalidRecord(String),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An outbox error occurred inside the transactional scope.
    #[error("outbox error: {0}")]
    Outbox(#[from] outbox::OutboxError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
