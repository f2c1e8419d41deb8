use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;

use crate::{
    MessageId, OutboxError, OutboxMessage, OutboxStatus, Result, store::OutboxStore,
};

/// In-memory outbox store for testing and single-process use.
///
/// Provides the same interface as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryOutboxStore {
    messages: Arc<RwLock<Vec<OutboxMessage>>>,
}

impl InMemoryOutboxStore {
    /// Creates a new empty in-memory outbox store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all messages regardless of status, in enqueue order.
    pub async fn all(&self) -> Vec<OutboxMessage> {
        self.messages.read().await.clone()
    }

    /// Returns the total number of messages stored.
    pub async fn message_count(&self) -> usize {
        self.messages.read().await.len()
    }

    /// Clears all messages.
    pub async fn clear(&self) {
        self.messages.write().await.clear();
    }

    async fn update<F>(&self, id: MessageId, f: F) -> Result<()>
    where
        F: FnOnce(&mut OutboxMessage),
    {
        let mut messages = self.messages.write().await;
        let message = messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(OutboxError::MessageNotFound(id))?;
        f(message);
        Ok(())
    }
}

#[async_trait]
impl OutboxStore for InMemoryOutboxStore {
    async fn insert(&self, message: OutboxMessage) -> Result<()> {
        self.messages.write().await.push(message);
        Ok(())
    }

    async fn get(&self, id: MessageId) -> Result<Option<OutboxMessage>> {
        let messages = self.messages.read().await;
        Ok(messages.iter().find(|m| m.id == id).cloned())
    }

    async fn load_pending(&self, limit: usize) -> Result<Vec<OutboxMessage>> {
        let messages = self.messages.read().await;
        Ok(messages
            .iter()
            .filter(|m| m.status == OutboxStatus::Pending)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn load_pending_older_than(&self, age: Duration) -> Result<Vec<OutboxMessage>> {
        let cutoff = Utc::now() - age;
        let messages = self.messages.read().await;
        Ok(messages
            .iter()
            .filter(|m| m.status == OutboxStatus::Pending && m.created_at < cutoff)
            .cloned()
            .collect())
    }

    async fn mark_sent(&self, id: MessageId, attempts: u32) -> Result<()> {
        self.update(id, |m| {
            m.status = OutboxStatus::Sent;
            m.attempts = attempts;
            m.sent_at = Some(Utc::now());
        })
        .await
    }

    async fn mark_retrying(&self, id: MessageId, attempts: u32) -> Result<()> {
        self.update(id, |m| {
            m.attempts = attempts;
        })
        .await
    }

    async fn mark_dead_letter(&self, id: MessageId, attempts: u32) -> Result<()> {
        self.update(id, |m| {
            m.status = OutboxStatus::DeadLetter;
            m.attempts = attempts;
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_message(event_type: &str) -> OutboxMessage {
        OutboxMessage::builder()
            .event_type(event_type)
            .destination("identity-exchange")
            .payload_raw(serde_json::json!({"k": "v"}))
            .build()
    }

    #[tokio::test]
    async fn insert_and_load_pending_preserves_order() {
        let store = InMemoryOutboxStore::new();
        store.insert(pending_message("First")).await.unwrap();
        store.insert(pending_message("Second")).await.unwrap();

        let pending = store.load_pending(10).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].event_type, "First");
        assert_eq!(pending[1].event_type, "Second");
    }

    #[tokio::test]
    async fn load_pending_respects_limit() {
        let store = InMemoryOutboxStore::new();
        for i in 0..5 {
            store.insert(pending_message(&format!("E{i}"))).await.unwrap();
        }

        let pending = store.load_pending(3).await.unwrap();
        assert_eq!(pending.len(), 3);
    }

    #[tokio::test]
    async fn mark_sent_is_terminal_and_records_attempts() {
        let store = InMemoryOutboxStore::new();
        let message = pending_message("UserCreated");
        let id = message.id;
        store.insert(message).await.unwrap();

        store.mark_sent(id, 3).await.unwrap();

        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, OutboxStatus::Sent);
        assert_eq!(stored.attempts, 3);
        assert!(stored.sent_at.is_some());
        assert!(store.load_pending(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mark_retrying_keeps_message_pending() {
        let store = InMemoryOutboxStore::new();
        let message = pending_message("UserCreated");
        let id = message.id;
        store.insert(message).await.unwrap();

        store.mark_retrying(id, 2).await.unwrap();

        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, OutboxStatus::Pending);
        assert_eq!(stored.attempts, 2);
        assert_eq!(store.load_pending(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mark_dead_letter_removes_from_pending() {
        let store = InMemoryOutboxStore::new();
        let message = pending_message("UserCreated");
        let id = message.id;
        store.insert(message).await.unwrap();

        store.mark_dead_letter(id, 5).await.unwrap();

        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, OutboxStatus::DeadLetter);
        assert_eq!(stored.attempts, 5);
        assert!(store.load_pending(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_unknown_message_fails() {
        let store = InMemoryOutboxStore::new();
        let result = store.mark_sent(MessageId::new(), 1).await;
        assert!(matches!(result, Err(OutboxError::MessageNotFound(_))));
    }

    #[tokio::test]
    async fn load_pending_older_than_filters_fresh_rows() {
        let store = InMemoryOutboxStore::new();

        let mut stale = pending_message("Stale");
        stale.created_at = Utc::now() - Duration::seconds(120);
        store.insert(stale).await.unwrap();
        store.insert(pending_message("Fresh")).await.unwrap();

        let stranded = store
            .load_pending_older_than(Duration::seconds(60))
            .await
            .unwrap();
        assert_eq!(stranded.len(), 1);
        assert_eq!(stranded[0].event_type, "Stale");
    }
}
