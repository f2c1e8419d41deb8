//! Application error taxonomy.

use domain::{UserError, ValidationErrors};
use outbox::OutboxError;
use store::StoreError;
use thiserror::Error;

/// Errors surfaced by use-case handlers.
///
/// Validation and state-conflict failures are recoverable caller errors;
/// store and outbox failures are infrastructure. No variant ever leaves
/// the aggregate store and the outbox store inconsistent: everything
/// before commit rolls back as one unit.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more field-level rules were violated.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// The email is already registered to another account.
    #[error("the email address already exists")]
    EmailAlreadyExists,

    /// A state-machine transition was rejected.
    #[error("{0}")]
    Conflict(UserError),

    /// The target user does not exist.
    #[error("user not found")]
    NotFound,

    /// Email or password provided are invalid.
    #[error("email or password provided are invalid")]
    InvalidCredentials,

    /// The caller lacks rights to the target resource.
    #[error("you are not authorized to access this resource")]
    NotAuthorized,

    /// The request was cancelled before any durable write.
    #[error("the operation was cancelled")]
    Cancelled,

    /// A storage failure occurred.
    #[error("store error: {0}")]
    Store(StoreError),

    /// An outbox failure occurred.
    #[error("outbox error: {0}")]
    Outbox(#[from] OutboxError),

    /// A serialization failure occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Returns the stable machine-readable code for this error.
    ///
    /// Validation errors carry per-field codes instead; see
    /// [`ValidationErrors`].
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Validation.Failed",
            AppError::EmailAlreadyExists => "User.EmailAlreadyExists",
            AppError::Conflict(inner) => inner.code(),
            AppError::NotFound => "User.NotFound",
            AppError::InvalidCredentials => "User.InvalidCredentials",
            AppError::NotAuthorized => "User.NotAuthorized",
            AppError::Cancelled => "Request.Cancelled",
            AppError::Store(_) => "Infrastructure.Store",
            AppError::Outbox(_) => "Infrastructure.Outbox",
            AppError::Serialization(_) => "Infrastructure.Serialization",
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<UserError> for AppError {
    fn from(error: UserError) -> Self {
        AppError::Conflict(error)
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DuplicateEmail => AppError::EmailAlreadyExists,
            other => AppError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_email_store_error_becomes_conflict() {
        let error: AppError = StoreError::DuplicateEmail.into();
        assert!(matches!(error, AppError::EmailAlreadyExists));
        assert_eq!(error.code(), "User.EmailAlreadyExists");
    }

    #[test]
    fn state_conflicts_carry_domain_codes() {
        let error: AppError = UserError::AlreadyDeactivated.into();
        assert_eq!(error.code(), "User.AlreadyDeactivated");
    }
}
