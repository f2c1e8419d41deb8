//! Broker publish contract.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::OutboxMessage;

/// Error raised while dispatching a message to the broker.
///
/// Treated as transient by the relay: every publish failure goes through
/// the retry sequence before the message is dead-lettered.
#[derive(Debug, Clone, Error)]
#[error("publish failed: {reason}")]
pub struct PublishError {
    pub reason: String,
}

impl PublishError {
    /// Creates a publish error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Returns the broker destination for a logical exchange name.
///
/// Destinations follow the `{logical-exchange-name}-exchange` convention.
pub fn exchange_name(logical: &str) -> String {
    format!("{logical}-exchange")
}

/// Trait for broker clients capable of publishing outbox messages.
///
/// The publisher only performs the network dispatch; retry, status
/// transitions, and dead-lettering are the relay's responsibility.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes a single message to its destination.
    async fn publish(&self, message: &OutboxMessage) -> Result<(), PublishError>;
}

/// Publisher that records published messages in memory.
///
/// Used in tests and single-process setups to observe what crossed the
/// service boundary.
#[derive(Clone, Default)]
pub struct InMemoryPublisher {
    published: Arc<RwLock<Vec<OutboxMessage>>>,
}

impl InMemoryPublisher {
    /// Creates a new in-memory publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all messages published so far.
    pub async fn published(&self) -> Vec<OutboxMessage> {
        self.published.read().await.clone()
    }

    /// Returns the number of messages published so far.
    pub async fn published_count(&self) -> usize {
        self.published.read().await.len()
    }
}

#[async_trait]
impl Publisher for InMemoryPublisher {
    async fn publish(&self, message: &OutboxMessage) -> Result<(), PublishError> {
        self.published.write().await.push(message.clone());
        Ok(())
    }
}

/// Publisher that logs the envelope instead of dispatching it.
///
/// Stand-in wiring for environments without a broker.
#[derive(Clone, Copy, Default)]
pub struct LoggingPublisher;

impl LoggingPublisher {
    /// Creates a new logging publisher.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Publisher for LoggingPublisher {
    async fn publish(&self, message: &OutboxMessage) -> Result<(), PublishError> {
        tracing::info!(
            message_id = %message.id,
            event_type = %message.event_type,
            destination = %message.destination,
            "publishing integration event"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_name_follows_convention() {
        assert_eq!(exchange_name("identity"), "identity-exchange");
    }

    #[tokio::test]
    async fn in_memory_publisher_records_messages() {
        let publisher = InMemoryPublisher::new();
        let message = OutboxMessage::builder()
            .event_type("UserCreated")
            .destination(exchange_name("identity"))
            .payload_raw(serde_json::json!({}))
            .build();

        publisher.publish(&message).await.unwrap();

        assert_eq!(publisher.published_count().await, 1);
        assert_eq!(publisher.published().await[0].id, message.id);
    }
}
