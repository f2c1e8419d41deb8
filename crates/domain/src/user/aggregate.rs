//! User aggregate implementation.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateRoot;
use crate::validation::{ValidationError, ValidationErrors};

use super::{
    AccountStatus, Email, Password, Role, UserError, UserEvent,
    events::{UserActivatedData, UserCreatedData, UserDeactivatedData},
};

const NAME_MAX_LENGTH: usize = 200;
const USERNAME_MIN_LENGTH: usize = 3;
const USERNAME_MAX_LENGTH: usize = 50;

/// User aggregate root.
///
/// State changes only through the mutation methods below; each records
/// exactly one domain event and immediately applies it, keeping the
/// in-process view consistent with the recorded history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAggregate {
    id: AggregateId,
    name: String,
    email: Email,
    username: String,
    password: Password,
    role: Role,
    status: AccountStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,

    /// Events recorded since the last commit. Never persisted.
    #[serde(skip)]
    uncommitted: Vec<UserEvent>,
}

/// Persisted user fields, as read back from storage.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: AggregateId,
    pub name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl AggregateRoot for UserAggregate {
    type Event = UserEvent;

    fn aggregate_type() -> &'static str {
        "User"
    }

    fn id(&self) -> AggregateId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            UserEvent::Created(data) => self.apply_created(data),
            UserEvent::Activated(data) => self.apply_activated(data),
            UserEvent::Deactivated(data) => self.apply_deactivated(data),
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted
    }

    fn take_uncommitted_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.uncommitted)
    }
}

// Construction
impl UserAggregate {
    /// Validates all inputs and creates a new active user.
    ///
    /// Validation accumulates every failure instead of stopping at the
    /// first; the aggregate is only constructed when no rule is violated,
    /// and then carries exactly one Created event.
    pub fn create(
        name: &str,
        email: &str,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let email = errors.absorb(Email::create(email));
        let password = errors.absorb(Password::create(password));
        let role = errors.absorb(Role::create(role));
        errors.merge(validate_name(name));
        errors.merge(validate_username(username));

        match (email, password, role) {
            (Some(email), Some(password), Some(role)) if errors.is_empty() => {
                let data = UserCreatedData {
                    user_id: AggregateId::new(),
                    name: name.to_string(),
                    email,
                    username: username.to_string(),
                    password,
                    role,
                    occurred_at: Utc::now(),
                };
                let mut user = Self::shell(data.clone());
                user.record(UserEvent::Created(data));
                Ok(user)
            }
            _ => Err(errors),
        }
    }

    /// Rebuilds an aggregate by replaying its full event history.
    ///
    /// Produces state identical to the instance that recorded the events
    /// live. The history must begin with a Created event.
    pub fn replay(events: Vec<UserEvent>) -> Result<Self, UserError> {
        let mut iter = events.into_iter();
        let first = iter.next().ok_or(UserError::MissingCreationEvent)?;
        let UserEvent::Created(ref data) = first else {
            return Err(UserError::MissingCreationEvent);
        };

        let mut user = Self::shell(data.clone());
        user.apply(first);
        for event in iter {
            user.apply(event);
        }
        Ok(user)
    }

    /// Rehydrates an aggregate from persisted state, without events.
    ///
    /// The reload path performs no complexity checks: stored values were
    /// validated when first created.
    pub fn from_stored(stored: StoredUser) -> Result<Self, ValidationErrors> {
        let password = Password::from_hash(&stored.password_hash)?;
        let role = Role::create(&stored.role)?;

        Ok(Self {
            id: stored.id,
            name: stored.name,
            email: Email::from_stored(stored.email),
            username: stored.username,
            password,
            role,
            status: if stored.is_active {
                AccountStatus::Active
            } else {
                AccountStatus::Inactive
            },
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            version: stored.version,
            uncommitted: Vec::new(),
        })
    }

    /// Snapshots the persisted fields for storage.
    ///
    /// Uncommitted events are transient and never part of the snapshot.
    pub fn to_stored(&self) -> StoredUser {
        StoredUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.as_str().to_string(),
            username: self.username.clone(),
            password_hash: self.password.hash().to_string(),
            role: self.role.as_str().to_string(),
            is_active: self.is_active(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: self.version,
        }
    }

    /// Initial field values before the Created event is applied.
    fn shell(data: UserCreatedData) -> Self {
        Self {
            id: data.user_id,
            name: data.name,
            email: data.email,
            username: data.username,
            password: data.password,
            role: data.role,
            status: AccountStatus::Active,
            created_at: data.occurred_at,
            updated_at: data.occurred_at,
            version: 0,
            uncommitted: Vec::new(),
        }
    }
}

// Command methods
impl UserAggregate {
    /// Deactivates an active account.
    pub fn deactivate(&mut self) -> Result<(), UserError> {
        if !self.status.can_deactivate() {
            return Err(UserError::AlreadyDeactivated);
        }
        self.record(UserEvent::deactivated(self.id));
        Ok(())
    }

    /// Reactivates a deactivated account.
    pub fn activate(&mut self) -> Result<(), UserError> {
        if !self.status.can_activate() {
            return Err(UserError::AlreadyActive);
        }
        self.record(UserEvent::activated(self.id));
        Ok(())
    }

    /// Records a new event and applies it to the in-memory state.
    fn record(&mut self, event: UserEvent) {
        self.uncommitted.push(event.clone());
        self.apply(event);
    }
}

// Apply helpers
impl UserAggregate {
    fn apply_created(&mut self, data: UserCreatedData) {
        self.id = data.user_id;
        self.name = data.name;
        self.email = data.email;
        self.username = data.username;
        self.password = data.password;
        self.role = data.role;
        self.status = AccountStatus::Active;
        self.created_at = data.occurred_at;
        self.updated_at = data.occurred_at;
    }

    fn apply_activated(&mut self, data: UserActivatedData) {
        self.status = AccountStatus::Active;
        self.updated_at = data.occurred_at;
    }

    fn apply_deactivated(&mut self, data: UserDeactivatedData) {
        self.status = AccountStatus::Inactive;
        self.updated_at = data.occurred_at;
    }
}

// Query methods
impl UserAggregate {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn status(&self) -> AccountStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn validate_name(name: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if name.trim().is_empty() {
        errors.push(ValidationError::new("Name.Required", "Name is required."));
    } else if name.len() > NAME_MAX_LENGTH {
        errors.push(ValidationError::new(
            "Name.TooLong",
            format!("Name must be at most {NAME_MAX_LENGTH} characters."),
        ));
    }
    errors
}

fn validate_username(username: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if username.trim().is_empty() {
        errors.push(ValidationError::new(
            "Username.Required",
            "Username is required.",
        ));
    } else if username.len() < USERNAME_MIN_LENGTH {
        errors.push(ValidationError::new(
            "Username.TooShort",
            format!("Username must be at least {USERNAME_MIN_LENGTH} characters."),
        ));
    } else if username.len() > USERNAME_MAX_LENGTH {
        errors.push(ValidationError::new(
            "Username.TooLong",
            format!("Username must be at most {USERNAME_MAX_LENGTH} characters."),
        ));
    } else if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        errors.push(ValidationError::new(
            "Username.InvalidFormat",
            "Username contains invalid characters.",
        ));
    }
    errors
}
