use async_trait::async_trait;
use common::AggregateId;
use domain::UserAggregate;

use crate::Result;

/// Write-side repository for user aggregates.
///
/// Capability set: persist, query-by-id, query-by-uniqueness-predicate.
/// Command handlers use `email_exists`/`get_by_id` for validation and
/// loading; writes that must be atomic with outbox rows go through the
/// unit-of-work scope instead of `add`/`delete`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns true if a user with this email exists, case-insensitively.
    async fn email_exists(&self, email: &str) -> Result<bool>;

    /// Loads a user aggregate by ID.
    async fn get_by_id(&self, id: AggregateId) -> Result<Option<UserAggregate>>;

    /// Persists a user outside any transactional scope (auto-commit).
    async fn add(&self, user: &UserAggregate) -> Result<()>;

    /// Deletes a user by ID.
    async fn delete(&self, id: AggregateId) -> Result<()>;
}
