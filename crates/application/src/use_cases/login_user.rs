//! Login use case types.

use domain::{Email, ValidationError, ValidationErrors};
use serde::Deserialize;

/// Command to authenticate a user.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginUserCommand {
    pub email: String,
    pub password: String,
}

impl LoginUserCommand {
    /// Structural validation only; credentials are checked against the
    /// read store afterwards.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.email.trim().is_empty() {
            errors.push(ValidationError::new("Email.Required", "Email is required."));
        } else if let Err(email_errors) = Email::create(&self.email) {
            errors.merge(email_errors);
        }

        if self.password.trim().is_empty() {
            errors.push(ValidationError::new(
                "Password.Required",
                "Password is required.",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
