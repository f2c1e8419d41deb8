//! Integration events and the domain-to-integration mapper.

use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{DomainEvent, Role, UserEvent};
use outbox::{MessageId, OutboxMessage, exchange_name};
use serde::{Deserialize, Serialize};

use crate::{ActorContext, SERVICE_NAME};

/// Envelope wrapping an integration event with correlation metadata.
///
/// This is the exact shape published to the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventContext<T> {
    /// Stable message identifier, also the outbox row id. A receiving-side
    /// inbox can deduplicate on it.
    pub message_id: MessageId,

    /// Id of the aggregate whose domain event caused this message.
    pub causation_id: AggregateId,

    /// Who performed the action.
    pub actor: String,

    /// The producing service.
    pub source: String,

    /// When the causing domain event occurred.
    pub occurred_at: DateTime<Utc>,

    /// The integration event itself.
    pub payload: T,
}

/// Cross-service facts derived from domain events.
///
/// Carries only externally relevant fields; internal value-object
/// machinery (password hashes included) never crosses this boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum IntegrationEvent {
    UserCreated(UserCreatedIntegration),
    UserActivated(UserStatusIntegration),
    UserDeactivated(UserStatusIntegration),
}

impl IntegrationEvent {
    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            IntegrationEvent::UserCreated(_) => "UserCreated",
            IntegrationEvent::UserActivated(_) => "UserActivated",
            IntegrationEvent::UserDeactivated(_) => "UserDeactivated",
        }
    }
}

/// Payload announcing a new user to other services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreatedIntegration {
    pub user_id: AggregateId,
    pub name: String,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub occurred_at: DateTime<Utc>,
}

/// Payload announcing an account status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatusIntegration {
    pub user_id: AggregateId,
    pub occurred_at: DateTime<Utc>,
}

/// Translates a domain event into zero or one integration events.
///
/// Pure: no I/O, no clock, no state. Enrichment with caller metadata
/// happens in the envelope, not here.
pub fn map_to_integration(event: &UserEvent) -> Option<IntegrationEvent> {
    match event {
        UserEvent::Created(data) => Some(IntegrationEvent::UserCreated(UserCreatedIntegration {
            user_id: data.user_id,
            name: data.name.clone(),
            email: data.email.as_str().to_string(),
            username: data.username.clone(),
            role: data.role,
            occurred_at: data.occurred_at,
        })),
        UserEvent::Activated(data) => {
            Some(IntegrationEvent::UserActivated(UserStatusIntegration {
                user_id: data.user_id,
                occurred_at: data.occurred_at,
            }))
        }
        UserEvent::Deactivated(data) => {
            Some(IntegrationEvent::UserDeactivated(UserStatusIntegration {
                user_id: data.user_id,
                occurred_at: data.occurred_at,
            }))
        }
    }
}

/// Builds the outbox message for a domain event, if it maps to an
/// integration event.
pub fn to_outbox_message(
    event: &UserEvent,
    actor: &ActorContext,
    exchange: &str,
) -> Result<Option<OutboxMessage>, serde_json::Error> {
    let Some(integration) = map_to_integration(event) else {
        return Ok(None);
    };

    let event_type = integration.event_type();
    let envelope = EventContext {
        message_id: MessageId::new(),
        causation_id: event.aggregate_id(),
        actor: actor.email.clone(),
        source: SERVICE_NAME.to_string(),
        occurred_at: event.occurred_at(),
        payload: integration,
    };

    let message = OutboxMessage::builder()
        .id(envelope.message_id)
        .event_type(event_type)
        .destination(exchange_name(exchange))
        .payload(&envelope)?
        .build();

    Ok(Some(message))
}

#[cfg(test)]
mod tests {
    use domain::{AggregateRoot, UserAggregate};

    use super::*;
    use crate::EXCHANGE;

    fn created_event() -> UserEvent {
        let mut user = UserAggregate::create(
            "John Doe",
            "John@Example.com",
            "johndoe",
            "Test@1234",
            "user",
        )
        .unwrap();
        user.take_uncommitted_events().remove(0)
    }

    #[test]
    fn created_maps_to_user_created_without_password() {
        let event = created_event();
        let integration = map_to_integration(&event).unwrap();

        let IntegrationEvent::UserCreated(payload) = &integration else {
            panic!("expected UserCreated");
        };
        assert_eq!(payload.email, "john@example.com");
        assert_eq!(payload.role, Role::User);

        let json = serde_json::to_string(&integration).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn status_events_map_to_status_payloads() {
        let id = AggregateId::new();

        let event = UserEvent::deactivated(id);
        assert!(matches!(
            map_to_integration(&event),
            Some(IntegrationEvent::UserDeactivated(_))
        ));

        let event = UserEvent::activated(id);
        assert!(matches!(
            map_to_integration(&event),
            Some(IntegrationEvent::UserActivated(_))
        ));
    }

    #[test]
    fn outbox_message_carries_envelope_and_destination() {
        let event = created_event();
        let actor = ActorContext::anonymous();
        let message = to_outbox_message(&event, &actor, EXCHANGE).unwrap().unwrap();

        assert_eq!(message.event_type, "UserCreated");
        assert_eq!(message.destination, "identity-exchange");

        let envelope: EventContext<IntegrationEvent> =
            serde_json::from_value(message.payload.clone()).unwrap();
        assert_eq!(envelope.message_id, message.id);
        assert_eq!(envelope.causation_id, event.aggregate_id());
        assert_eq!(envelope.actor, "anonymous");
        assert_eq!(envelope.source, SERVICE_NAME);
        assert_eq!(envelope.occurred_at, event.occurred_at());
    }
}
