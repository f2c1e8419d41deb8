//! User aggregate and related types.

mod aggregate;
mod events;
mod status;
mod value_objects;

pub use aggregate::{StoredUser, UserAggregate};
pub use events::{UserActivatedData, UserCreatedData, UserDeactivatedData, UserEvent};
pub use status::AccountStatus;
pub use value_objects::{Email, Password, Role};

use thiserror::Error;

/// Errors that can occur during user state transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserError {
    /// Activate was requested on a user that is already active.
    #[error("user is already active")]
    AlreadyActive,

    /// Deactivate was requested on a user that is already deactivated.
    #[error("user is already deactivated")]
    AlreadyDeactivated,

    /// An event history did not begin with a creation event.
    #[error("event history does not begin with a creation event")]
    MissingCreationEvent,
}

impl UserError {
    /// Returns the stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            UserError::AlreadyActive => "User.AlreadyActive",
            UserError::AlreadyDeactivated => "User.AlreadyDeactivated",
            UserError::MissingCreationEvent => "User.MissingCreationEvent",
        }
    }
}
