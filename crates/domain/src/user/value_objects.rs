//! Value objects for the user domain.
//!
//! Each value object validates itself at construction and is immutable once
//! built. Construction failures carry stable machine-readable codes.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};

use crate::validation::{ValidationError, ValidationErrors};

/// A validated, lowercase-normalized email address.
///
/// Equality is case-insensitive by construction: the value is normalized at
/// creation, so no special comparison logic is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    const MAX_LENGTH: usize = 200;

    /// Validates and normalizes an email address.
    pub fn create(value: &str) -> Result<Self, ValidationErrors> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationErrors::single("Email.Required", "Email is required."));
        }

        let normalized = trimmed.to_lowercase();
        let mut errors = ValidationErrors::new();

        if normalized.len() > Self::MAX_LENGTH {
            errors.push(ValidationError::new(
                "Email.MaximumLength",
                format!("Email must be at most {} characters.", Self::MAX_LENGTH),
            ));
        }
        if !Self::has_valid_format(&normalized) {
            errors.push(ValidationError::new(
                "Email.InvalidFormat",
                "Email format is invalid.",
            ));
        }

        if errors.is_empty() {
            Ok(Self(normalized))
        } else {
            Err(errors)
        }
    }

    /// Re-wraps an already-persisted value without re-validation.
    ///
    /// Used only on reload: stored values were normalized when first created.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the normalized address.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn has_valid_format(value: &str) -> bool {
        let Some((local, domain)) = value.split_once('@') else {
            return false;
        };
        !local.is_empty()
            && !domain.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !value.chars().any(char::is_whitespace)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A one-way password hash.
///
/// `create` hashes a plaintext password after enforcing minimum length and a
/// complexity rule; `from_hash` wraps an existing hash on reload and performs
/// no complexity check.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;

    /// Passwords rejected outright regardless of character classes.
    const COMMON_PASSWORDS: &'static [&'static str] =
        &["password", "12345678", "qwertyuiop", "letmein123", "iloveyou1"];

    /// Validates a plaintext password and stores its argon2 hash.
    pub fn create(plain: &str) -> Result<Self, ValidationErrors> {
        if plain.trim().is_empty() {
            return Err(ValidationErrors::single(
                "Password.Required",
                "Password is required.",
            ));
        }

        let mut errors = ValidationErrors::new();
        if plain.len() < Self::MIN_LENGTH {
            errors.push(ValidationError::new(
                "Password.TooShort",
                format!("Password must be at least {} characters.", Self::MIN_LENGTH),
            ));
        }
        if Self::is_weak(plain) {
            errors.push(ValidationError::new(
                "Password.Weak",
                "Password must contain upper and lower case letters, a digit and a special character.",
            ));
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                ValidationErrors::single("Password.HashFailure", format!("Password hashing failed: {e}."))
            })?;

        Ok(Self(hash.to_string()))
    }

    /// Wraps an existing hash on reload. No complexity check is performed.
    pub fn from_hash(hash: &str) -> Result<Self, ValidationErrors> {
        if hash.trim().is_empty() {
            return Err(ValidationErrors::single(
                "Password.Required",
                "Password hash is required.",
            ));
        }
        Ok(Self(hash.to_string()))
    }

    /// Verifies a plaintext password against the stored hash.
    pub fn verify(&self, plain: &str) -> bool {
        PasswordHash::new(&self.0)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(plain.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    /// Returns the stored hash.
    pub fn hash(&self) -> &str {
        &self.0
    }

    fn is_weak(plain: &str) -> bool {
        let lowered = plain.to_lowercase();
        if Self::COMMON_PASSWORDS.contains(&lowered.as_str()) {
            return true;
        }
        let has_upper = plain.chars().any(|c| c.is_ascii_uppercase());
        let has_lower = plain.chars().any(|c| c.is_ascii_lowercase());
        let has_digit = plain.chars().any(|c| c.is_ascii_digit());
        let has_symbol = plain.chars().any(|c| !c.is_ascii_alphanumeric());
        !(has_upper && has_lower && has_digit && has_symbol)
    }
}

// The hash never appears in debug output.
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password").field("hash", &"[REDACTED]").finish()
    }
}

/// A user role constrained to a small fixed whitelist.
///
/// Construction normalizes case to the canonical spelling; anything outside
/// the whitelist is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
    Moderator,
}

impl Role {
    /// Parses a role, case-insensitively, against the whitelist.
    pub fn create(value: &str) -> Result<Self, ValidationErrors> {
        match value.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            _ => Err(ValidationErrors::single(
                "Role.Invalid",
                "Role must be one of: User, Admin, Moderator.",
            )),
        }
    }

    /// Returns the canonical spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
            Role::Moderator => "Moderator",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_create_normalizes_to_lowercase() {
        for value in ["test@example.com", "user.name@domain.org", "john_doe123@company.co.uk"] {
            let email = Email::create(value).unwrap();
            assert_eq!(email.as_str(), value.to_lowercase());
        }

        let email = Email::create("John@Example.Com").unwrap();
        assert_eq!(email.as_str(), "john@example.com");
    }

    #[test]
    fn email_create_rejects_empty() {
        for value in ["", " "] {
            let errors = Email::create(value).unwrap_err();
            assert!(errors.contains("Email.Required"));
        }
    }

    #[test]
    fn email_create_rejects_invalid_format() {
        for value in ["invalid", "test@", "@domain.com", "test.domain.com"] {
            let errors = Email::create(value).unwrap_err();
            assert!(errors.contains("Email.InvalidFormat"), "expected failure for {value}");
        }
    }

    #[test]
    fn email_create_rejects_excessive_length() {
        let long = format!("{}@example.com", "a".repeat(190));
        let errors = Email::create(&long).unwrap_err();
        assert!(errors.contains("Email.MaximumLength"));
    }

    #[test]
    fn email_from_stored_preserves_value() {
        let email = Email::from_stored("test@example.com");
        assert_eq!(email.as_str(), "test@example.com");
    }

    #[test]
    fn password_create_succeeds_for_strong_passwords() {
        for value in ["Test@123", "SecureP@ss1", "MyP@ssw0rd!"] {
            let password = Password::create(value).unwrap();
            assert!(!password.hash().is_empty());
        }
    }

    #[test]
    fn password_create_rejects_empty() {
        for value in ["", " "] {
            let errors = Password::create(value).unwrap_err();
            assert!(errors.contains("Password.Required"));
        }
    }

    #[test]
    fn password_create_rejects_short_passwords() {
        for value in ["Aa1@", "Short1!"] {
            let errors = Password::create(value).unwrap_err();
            assert!(errors.contains("Password.TooShort"));
        }
    }

    #[test]
    fn password_create_rejects_weak_passwords() {
        for value in ["password", "PASSWORD", "Password", "password1", "Password1"] {
            let errors = Password::create(value).unwrap_err();
            assert!(errors.contains("Password.Weak"), "expected weak for {value}");
        }
    }

    #[test]
    fn password_verify_matches_original_plaintext() {
        let password = Password::create("Test@1234").unwrap();
        assert!(password.verify("Test@1234"));
        assert!(!password.verify("WrongPassword1!"));
    }

    #[test]
    fn password_from_hash_preserves_hash_and_verifies() {
        let password = Password::create("Test@1234").unwrap();
        let restored = Password::from_hash(password.hash()).unwrap();
        assert_eq!(restored.hash(), password.hash());
        assert!(restored.verify("Test@1234"));
    }

    #[test]
    fn password_from_hash_rejects_empty() {
        for value in ["", " "] {
            let errors = Password::from_hash(value).unwrap_err();
            assert!(errors.contains("Password.Required"));
        }
    }

    #[test]
    fn password_same_plaintext_produces_different_salted_hashes() {
        let first = Password::create("Test@1234").unwrap();
        let second = Password::create("Test@1234").unwrap();
        assert_ne!(first.hash(), second.hash());
    }

    #[test]
    fn password_debug_redacts_hash() {
        let password = Password::create("Test@1234").unwrap();
        let debug = format!("{password:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(password.hash()));
    }

    #[test]
    fn role_create_normalizes_case() {
        assert_eq!(Role::create("user").unwrap(), Role::User);
        assert_eq!(Role::create("ADMIN").unwrap(), Role::Admin);
        assert_eq!(Role::create("Moderator").unwrap(), Role::Moderator);
        assert_eq!(Role::create("admin").unwrap().as_str(), "Admin");
    }

    #[test]
    fn role_create_rejects_unknown_roles() {
        for value in ["", " ", "InvalidRole", "SuperAdmin"] {
            let errors = Role::create(value).unwrap_err();
            assert!(errors.contains("Role.Invalid"));
        }
    }

    #[test]
    fn role_canonical_spellings() {
        assert_eq!(Role::User.as_str(), "User");
        assert_eq!(Role::Admin.as_str(), "Admin");
        assert_eq!(Role::Moderator.as_str(), "Moderator");
    }

    #[test]
    fn role_serializes_to_canonical_spelling() {
        let json = serde_json::to_string(&Role::Moderator).unwrap();
        assert_eq!(json, "\"Moderator\"");
    }
}
