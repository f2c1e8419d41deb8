use async_trait::async_trait;
use chrono::Duration;

use crate::{MessageId, OutboxMessage, Result};

/// Core trait for outbox store implementations.
///
/// The store holds durably committed messages and their delivery status.
/// Inserting within an open database transaction is implementation-specific
/// (see the transactional scope in the persistence layer); everything here
/// runs against committed rows. All implementations must be thread-safe.
#[async_trait]
pub trait OutboxStore: Send + Sync {
    /// Inserts a message directly (auto-commit).
    ///
    /// The transactional enqueue path goes through the unit-of-work scope
    /// instead; this is for standalone use and tests.
    async fn insert(&self, message: OutboxMessage) -> Result<()>;

    /// Retrieves a message by ID.
    async fn get(&self, id: MessageId) -> Result<Option<OutboxMessage>>;

    /// Loads pending messages in enqueue order, up to `limit`.
    async fn load_pending(&self, limit: usize) -> Result<Vec<OutboxMessage>>;

    /// Loads pending messages enqueued more than `age` ago.
    ///
    /// The recovery sweep uses this to find rows stranded by a crash
    /// between commit and flush.
    async fn load_pending_older_than(&self, age: Duration) -> Result<Vec<OutboxMessage>>;

    /// Marks a message as delivered, recording the final attempt count.
    async fn mark_sent(&self, id: MessageId, attempts: u32) -> Result<()>;

    /// Records a failed delivery attempt; the message stays pending.
    async fn mark_retrying(&self, id: MessageId, attempts: u32) -> Result<()>;

    /// Marks a message as dead-lettered after exhausting the retry budget.
    async fn mark_dead_letter(&self, id: MessageId, attempts: u32) -> Result<()>;
}
