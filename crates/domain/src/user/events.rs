//! User domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{Email, Password, Role};

/// Events that can occur on a user aggregate.
///
/// A closed sum type: every apply-site matches exhaustively, so adding a
/// variant forces all of them to be updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UserEvent {
    /// A user account was created.
    Created(UserCreatedData),

    /// A deactivated account was reactivated.
    Activated(UserActivatedData),

    /// An active account was deactivated.
    Deactivated(UserDeactivatedData),
}

impl DomainEvent for UserEvent {
    fn event_type(&self) -> &'static str {
        match self {
            UserEvent::Created(_) => "UserCreated",
            UserEvent::Activated(_) => "UserActivated",
            UserEvent::Deactivated(_) => "UserDeactivated",
        }
    }

    fn aggregate_id(&self) -> AggregateId {
        match self {
            UserEvent::Created(data) => data.user_id,
            UserEvent::Activated(data) => data.user_id,
            UserEvent::Deactivated(data) => data.user_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            UserEvent::Created(data) => data.occurred_at,
            UserEvent::Activated(data) => data.occurred_at,
            UserEvent::Deactivated(data) => data.occurred_at,
        }
    }
}

/// Data for the Created event.
///
/// Carries everything needed to reconstruct the account's initial state.
/// The password field serializes to its one-way hash only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreatedData {
    pub user_id: AggregateId,
    pub name: String,
    pub email: Email,
    pub username: String,
    pub password: Password,
    pub role: Role,
    pub occurred_at: DateTime<Utc>,
}

/// Data for the Activated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserActivatedData {
    pub user_id: AggregateId,
    pub occurred_at: DateTime<Utc>,
}

/// Data for the Deactivated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDeactivatedData {
    pub user_id: AggregateId,
    pub occurred_at: DateTime<Utc>,
}

impl UserEvent {
    /// Creates a Created event.
    pub fn created(
        user_id: AggregateId,
        name: impl Into<String>,
        email: Email,
        username: impl Into<String>,
        password: Password,
        role: Role,
    ) -> Self {
        UserEvent::Created(UserCreatedData {
            user_id,
            name: name.into(),
            email,
            username: username.into(),
            password,
            role,
            occurred_at: Utc::now(),
        })
    }

    /// Creates an Activated event.
    pub fn activated(user_id: AggregateId) -> Self {
        UserEvent::Activated(UserActivatedData {
            user_id,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a Deactivated event.
    pub fn deactivated(user_id: AggregateId) -> Self {
        UserEvent::Deactivated(UserDeactivatedData {
            user_id,
            occurred_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created_event() -> UserEvent {
        UserEvent::created(
            AggregateId::new(),
            "John Doe",
            Email::create("john@example.com").unwrap(),
            "johndoe",
            Password::create("Test@1234").unwrap(),
            Role::User,
        )
    }

    #[test]
    fn event_types() {
        let id = AggregateId::new();
        assert_eq!(created_event().event_type(), "UserCreated");
        assert_eq!(UserEvent::activated(id).event_type(), "UserActivated");
        assert_eq!(UserEvent::deactivated(id).event_type(), "UserDeactivated");
    }

    #[test]
    fn aggregate_id_matches_payload() {
        let id = AggregateId::new();
        let event = UserEvent::deactivated(id);
        assert_eq!(event.aggregate_id(), id);
    }

    #[test]
    fn created_event_serialization_roundtrip() {
        let event = created_event();
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"UserCreated\""));

        let deserialized: UserEvent = serde_json::from_str(&json).unwrap();
        let UserEvent::Created(data) = deserialized else {
            panic!("expected Created event");
        };
        assert_eq!(data.name, "John Doe");
        assert_eq!(data.email.as_str(), "john@example.com");
        assert_eq!(data.role, Role::User);
    }

    #[test]
    fn created_event_serializes_password_as_hash_only() {
        let event = created_event();
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("Test@1234"));
    }
}
