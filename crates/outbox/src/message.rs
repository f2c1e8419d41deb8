//! Outbox message representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::OutboxStatus;

/// Unique identifier for an outbox message.
///
/// Stable across retries, and carried in the published envelope so a
/// receiving-side inbox can deduplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Creates a new random message ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a message ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One integration event pending delivery.
///
/// Written in the same transaction as the aggregate-state change that
/// produced it; mutated only by the flush/retry process afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxMessage {
    /// Unique message identifier.
    pub id: MessageId,

    /// The integration event type (e.g. "UserCreated").
    pub event_type: String,

    /// Broker destination (exchange name).
    pub destination: String,

    /// Serialized event envelope.
    pub payload: serde_json::Value,

    /// Delivery status.
    pub status: OutboxStatus,

    /// Number of delivery attempts so far.
    pub attempts: u32,

    /// When the message was enqueued.
    pub created_at: DateTime<Utc>,

    /// When the message was delivered, if it was.
    pub sent_at: Option<DateTime<Utc>>,
}

impl OutboxMessage {
    /// Creates a new outbox message builder.
    pub fn builder() -> OutboxMessageBuilder {
        OutboxMessageBuilder::default()
    }
}

/// Builder for constructing outbox messages.
#[derive(Debug, Default)]
pub struct OutboxMessageBuilder {
    id: Option<MessageId>,
    event_type: Option<String>,
    destination: Option<String>,
    payload: Option<serde_json::Value>,
    created_at: Option<DateTime<Utc>>,
}

impl OutboxMessageBuilder {
    /// Sets the message ID. If not set, a new ID is generated.
    pub fn id(mut self, id: MessageId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the event type.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Sets the broker destination.
    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Sets the payload from a serializable value.
    pub fn payload<T: serde::Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Sets the payload from a raw JSON value.
    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Sets the creation timestamp. If not set, the current time is used.
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Builds the message in `pending` state with zero attempts.
    ///
    /// # Panics
    ///
    /// Panics if event_type, destination, or payload are not set.
    pub fn build(self) -> OutboxMessage {
        OutboxMessage {
            id: self.id.unwrap_or_default(),
            event_type: self.event_type.expect("event_type is required"),
            destination: self.destination.expect("destination is required"),
            payload: self.payload.expect("payload is required"),
            status: OutboxStatus::Pending,
            attempts: 0,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            sent_at: None,
        }
    }

    /// Tries to build the message, returning None if required fields are missing.
    pub fn try_build(self) -> Option<OutboxMessage> {
        Some(OutboxMessage {
            id: self.id.unwrap_or_default(),
            event_type: self.event_type?,
            destination: self.destination?,
            payload: self.payload?,
            status: OutboxStatus::Pending,
            attempts: 0,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            sent_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_id_new_creates_unique_ids() {
        assert_ne!(MessageId::new(), MessageId::new());
    }

    #[test]
    fn builder_produces_pending_message() {
        let message = OutboxMessage::builder()
            .event_type("UserCreated")
            .destination("identity-exchange")
            .payload_raw(serde_json::json!({"user_id": "abc"}))
            .build();

        assert_eq!(message.event_type, "UserCreated");
        assert_eq!(message.destination, "identity-exchange");
        assert_eq!(message.status, OutboxStatus::Pending);
        assert_eq!(message.attempts, 0);
        assert!(message.sent_at.is_none());
    }

    #[test]
    fn try_build_returns_none_on_missing_fields() {
        assert!(OutboxMessage::builder().try_build().is_none());
    }

    #[test]
    fn payload_serializes_value() {
        #[derive(serde::Serialize)]
        struct Payload {
            user_id: u32,
        }

        let message = OutboxMessage::builder()
            .event_type("UserCreated")
            .destination("identity-exchange")
            .payload(&Payload { user_id: 7 })
            .unwrap()
            .build();

        assert_eq!(message.payload["user_id"], 7);
    }
}
