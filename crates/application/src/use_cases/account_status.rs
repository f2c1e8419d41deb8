//! Activate/deactivate use case types.

use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{AggregateRoot, UserAggregate};
use serde::{Deserialize, Serialize};

/// Command to deactivate an active user.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DeactivateUserCommand {
    pub user_id: AggregateId,
}

/// Command to reactivate a deactivated user.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ActivateUserCommand {
    pub user_id: AggregateId,
}

/// Response DTO for status transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStatusResponse {
    pub id: AggregateId,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl UserStatusResponse {
    /// Builds the response from the persisted aggregate.
    pub fn from_aggregate(user: &UserAggregate) -> Self {
        Self {
            id: user.id(),
            is_active: user.is_active(),
            updated_at: user.updated_at(),
        }
    }
}
