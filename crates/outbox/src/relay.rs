//! Outbox relay: publishes committed rows with bounded retry.

use chrono::Duration;

use crate::{
    OutboxMessage, OutboxStatus, Result, RetryPolicy, publisher::Publisher, store::OutboxStore,
};

/// Maximum number of pending rows drained per flush.
const FLUSH_BATCH_SIZE: usize = 100;

/// Outcome of one flush or sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSummary {
    /// Messages delivered during this pass.
    pub sent: usize,

    /// Messages that exhausted the retry budget during this pass.
    pub dead_lettered: usize,
}

/// Publishes committed outbox rows to the broker.
///
/// Publishing is decoupled from the transaction that wrote the rows: the
/// relay only ever sees durably committed messages, so a crash at any point
/// here loses nothing — the row stays `pending` and the recovery sweep
/// picks it up.
pub struct OutboxRelay<S: OutboxStore, P: Publisher> {
    store: S,
    publisher: P,
    policy: RetryPolicy,
}

impl<S: OutboxStore, P: Publisher> OutboxRelay<S, P> {
    /// Creates a new relay.
    pub fn new(store: S, publisher: P, policy: RetryPolicy) -> Self {
        Self {
            store,
            publisher,
            policy,
        }
    }

    /// Returns a reference to the underlying outbox store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Publishes every still-pending committed row.
    ///
    /// Called after each command commit, and by the recovery sweep.
    #[tracing::instrument(skip(self))]
    pub async fn flush(&self) -> Result<FlushSummary> {
        let pending = self.store.load_pending(FLUSH_BATCH_SIZE).await?;
        self.dispatch_all(pending).await
    }

    /// Recovery pass: republishes pending rows older than `older_than`.
    ///
    /// Covers the crash window between commit and flush; the interval is
    /// chosen so rows still being flushed by their own command are not
    /// double-dispatched.
    #[tracing::instrument(skip(self))]
    pub async fn sweep(&self, older_than: Duration) -> Result<FlushSummary> {
        let stranded = self.store.load_pending_older_than(older_than).await?;
        if !stranded.is_empty() {
            tracing::info!(count = stranded.len(), "recovering stranded outbox rows");
        }
        self.dispatch_all(stranded).await
    }

    async fn dispatch_all(&self, messages: Vec<OutboxMessage>) -> Result<FlushSummary> {
        let mut summary = FlushSummary::default();
        for message in messages {
            match self.dispatch(message).await? {
                OutboxStatus::Sent => summary.sent += 1,
                OutboxStatus::DeadLetter => summary.dead_lettered += 1,
                OutboxStatus::Pending => {}
            }
        }
        Ok(summary)
    }

    /// Dispatches one message, retrying per policy.
    ///
    /// Every failure path ends in an explicit status transition; exhaustion
    /// is surfaced through a counter and an error-level log, never silently.
    async fn dispatch(&self, message: OutboxMessage) -> Result<OutboxStatus> {
        let already_attempted = message.attempts;

        for attempt in 1..=self.policy.max_attempts() {
            let total_attempts = already_attempted + attempt;

            match self.publisher.publish(&message).await {
                Ok(()) => {
                    self.store.mark_sent(message.id, total_attempts).await?;
                    metrics::counter!("outbox_messages_sent_total").increment(1);
                    tracing::debug!(
                        message_id = %message.id,
                        event_type = %message.event_type,
                        attempts = total_attempts,
                        "outbox message published"
                    );
                    return Ok(OutboxStatus::Sent);
                }
                Err(error) => {
                    match self.policy.cooldown_after(attempt) {
                        Some(delay) => {
                            self.store.mark_retrying(message.id, total_attempts).await?;
                            metrics::counter!("outbox_publish_retries_total").increment(1);
                            tracing::warn!(
                                message_id = %message.id,
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                %error,
                                "publish failed, retrying after cooldown"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => {
                            self.store
                                .mark_dead_letter(message.id, total_attempts)
                                .await?;
                            metrics::counter!("outbox_messages_dead_lettered_total").increment(1);
                            tracing::error!(
                                message_id = %message.id,
                                event_type = %message.event_type,
                                attempts = total_attempts,
                                %error,
                                "outbox message dead-lettered after exhausting retries"
                            );
                            return Ok(OutboxStatus::DeadLetter);
                        }
                    }
                }
            }
        }

        // max_attempts >= 1 always terminates the loop above.
        Ok(OutboxStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration as StdDuration;

    use async_trait::async_trait;

    use super::*;
    use crate::{InMemoryOutboxStore, InMemoryPublisher, PublishError, exchange_name};

    /// Publisher that fails a configured number of times before succeeding.
    #[derive(Clone, Default)]
    struct FlakyPublisher {
        failures_remaining: Arc<AtomicU32>,
        attempts_seen: Arc<AtomicU32>,
    }

    impl FlakyPublisher {
        fn failing(times: u32) -> Self {
            Self {
                failures_remaining: Arc::new(AtomicU32::new(times)),
                attempts_seen: Arc::new(AtomicU32::new(0)),
            }
        }

        fn attempts_seen(&self) -> u32 {
            self.attempts_seen.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Publisher for FlakyPublisher {
        async fn publish(&self, _message: &OutboxMessage) -> std::result::Result<(), PublishError> {
            self.attempts_seen.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures_remaining.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
                return Err(PublishError::new("broker unreachable"));
            }
            Ok(())
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(vec![StdDuration::from_millis(1); 5])
    }

    async fn enqueue(store: &InMemoryOutboxStore, event_type: &str) -> crate::MessageId {
        let message = OutboxMessage::builder()
            .event_type(event_type)
            .destination(exchange_name("identity"))
            .payload_raw(serde_json::json!({"k": "v"}))
            .build();
        let id = message.id;
        store.insert(message).await.unwrap();
        id
    }

    #[tokio::test]
    async fn flush_publishes_pending_messages_first_try() {
        let store = InMemoryOutboxStore::new();
        let publisher = InMemoryPublisher::new();
        let relay = OutboxRelay::new(store.clone(), publisher.clone(), fast_policy());

        let id = enqueue(&store, "UserCreated").await;
        let summary = relay.flush().await.unwrap();

        assert_eq!(summary, FlushSummary { sent: 1, dead_lettered: 0 });
        assert_eq!(publisher.published_count().await, 1);

        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, OutboxStatus::Sent);
        assert_eq!(stored.attempts, 1);
        assert!(stored.sent_at.is_some());
    }

    #[tokio::test]
    async fn transient_failures_end_in_sent_with_five_attempts() {
        let store = InMemoryOutboxStore::new();
        let publisher = FlakyPublisher::failing(4);
        let relay = OutboxRelay::new(store.clone(), publisher.clone(), fast_policy());

        let id = enqueue(&store, "UserCreated").await;
        let summary = relay.flush().await.unwrap();

        assert_eq!(summary, FlushSummary { sent: 1, dead_lettered: 0 });
        assert_eq!(publisher.attempts_seen(), 5);

        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, OutboxStatus::Sent);
        assert_eq!(stored.attempts, 5);
    }

    #[tokio::test]
    async fn exhausted_retries_end_in_dead_letter() {
        let store = InMemoryOutboxStore::new();
        let publisher = FlakyPublisher::failing(u32::MAX);
        let relay = OutboxRelay::new(store.clone(), publisher.clone(), fast_policy());

        let id = enqueue(&store, "UserCreated").await;
        let summary = relay.flush().await.unwrap();

        assert_eq!(summary, FlushSummary { sent: 0, dead_lettered: 1 });
        assert_eq!(publisher.attempts_seen(), 5);

        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, OutboxStatus::DeadLetter);
        assert_eq!(stored.attempts, 5);
    }

    #[tokio::test]
    async fn dead_lettered_messages_are_never_retried() {
        let store = InMemoryOutboxStore::new();
        let publisher = FlakyPublisher::failing(u32::MAX);
        let relay = OutboxRelay::new(store.clone(), publisher.clone(), fast_policy());

        enqueue(&store, "UserCreated").await;
        relay.flush().await.unwrap();
        assert_eq!(publisher.attempts_seen(), 5);

        // Another flush must not touch the dead-lettered row.
        let summary = relay.flush().await.unwrap();
        assert_eq!(summary, FlushSummary::default());
        assert_eq!(publisher.attempts_seen(), 5);
    }

    #[tokio::test]
    async fn sweep_recovers_stranded_rows_only() {
        let store = InMemoryOutboxStore::new();
        let publisher = InMemoryPublisher::new();
        let relay = OutboxRelay::new(store.clone(), publisher.clone(), fast_policy());

        let mut stranded = OutboxMessage::builder()
            .event_type("Stranded")
            .destination(exchange_name("identity"))
            .payload_raw(serde_json::json!({}))
            .build();
        stranded.created_at = chrono::Utc::now() - Duration::seconds(120);
        let stranded_id = stranded.id;
        store.insert(stranded).await.unwrap();

        let fresh_id = enqueue(&store, "Fresh").await;

        let summary = relay.sweep(Duration::seconds(60)).await.unwrap();
        assert_eq!(summary, FlushSummary { sent: 1, dead_lettered: 0 });

        let stranded = store.get(stranded_id).await.unwrap().unwrap();
        assert_eq!(stranded.status, OutboxStatus::Sent);

        // The fresh row is left for its own command's flush.
        let fresh = store.get(fresh_id).await.unwrap().unwrap();
        assert_eq!(fresh.status, OutboxStatus::Pending);
    }

    #[tokio::test]
    async fn sweep_resumes_attempt_count_from_previous_runs() {
        let store = InMemoryOutboxStore::new();
        let publisher = FlakyPublisher::failing(0);
        let relay = OutboxRelay::new(store.clone(), publisher, fast_policy());

        let mut message = OutboxMessage::builder()
            .event_type("Recovered")
            .destination(exchange_name("identity"))
            .payload_raw(serde_json::json!({}))
            .build();
        message.created_at = chrono::Utc::now() - Duration::seconds(120);
        message.attempts = 2;
        let id = message.id;
        store.insert(message).await.unwrap();

        relay.sweep(Duration::seconds(60)).await.unwrap();

        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, OutboxStatus::Sent);
        assert_eq!(stored.attempts, 3);
    }
}
