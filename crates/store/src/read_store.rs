use async_trait::async_trait;
use common::AggregateId;
use domain::Role;

use crate::{Result, query::UserListQuery};

/// User projection returned by email lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    pub id: AggregateId,
    pub name: String,
    pub email: String,
    pub username: String,
    pub role: Role,
}

/// One row of a user listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListItem {
    pub id: AggregateId,
    pub name: String,
    pub email: String,
    pub username: String,
    pub role: Role,
}

/// The authenticated principal's data, for token issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub user_id: AggregateId,
    pub name: String,
    pub email: String,
    pub username: String,
    pub role: Role,
}

/// Read-side queries, bypassing the command pipeline.
///
/// Pure queries: nothing here mutates state or produces events.
#[async_trait]
pub trait UserReadStore: Send + Sync {
    /// Looks up an active user by email, case-insensitively.
    async fn get_by_email(&self, email: &str) -> Result<Option<UserDetails>>;

    /// Lists users matching the structured filter/sort/page specification.
    /// Only active users are listed.
    async fn get_user_list(&self, query: &UserListQuery) -> Result<Vec<UserListItem>>;

    /// Returns the principal's data if the email exists and the password
    /// verifies against the stored hash; None otherwise.
    async fn get_token_info(&self, email: &str, password: &str) -> Result<Option<TokenInfo>>;
}
