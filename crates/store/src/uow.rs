use async_trait::async_trait;
use common::AggregateId;
use domain::UserAggregate;
use outbox::OutboxMessage;

use crate::Result;

/// The transactional boundary around aggregate persistence.
///
/// `begin` opens a scope; everything staged inside it becomes durable as
/// one atomic unit at `commit`, or not at all.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// The transactional scope type for this storage technology.
    type Scope: TxScope;

    /// Opens a new transactional scope.
    async fn begin(&self) -> Result<Self::Scope>;
}

/// One open transaction over aggregate state and outbox rows.
///
/// Outbox writes happen inside this scope, so it is never possible to
/// observe a durably committed aggregate state without the corresponding
/// committed outbox entries, or vice versa. Dropping the scope without
/// committing rolls everything back.
#[async_trait]
pub trait TxScope: Send {
    /// Stages the aggregate's persisted state (insert or update by id).
    async fn persist_user(&mut self, user: &UserAggregate) -> Result<()>;

    /// Stages the deletion of a user.
    async fn delete_user(&mut self, id: AggregateId) -> Result<()>;

    /// Stages an outbox message for atomic write alongside the aggregate.
    /// Performs no network I/O.
    async fn enqueue(&mut self, message: OutboxMessage) -> Result<()>;

    /// Commits the transaction, returning the number of staged writes.
    async fn commit(self) -> Result<u64>;
}
