//! Create user use case types.

use common::AggregateId;
use domain::{AggregateRoot, Role, UserAggregate};
use serde::{Deserialize, Serialize};

/// Command to register a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserCommand {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: String,
}

/// Response DTO built from the final aggregate state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateUserResponse {
    pub id: AggregateId,
    pub name: String,
    pub email: String,
    pub username: String,
    pub role: Role,
}

impl CreateUserResponse {
    /// Builds the response from the persisted aggregate.
    pub fn from_aggregate(user: &UserAggregate) -> Self {
        Self {
            id: user.id(),
            name: user.name().to_string(),
            email: user.email().as_str().to_string(),
            username: user.username().to_string(),
            role: user.role(),
        }
    }
}
