//! Field-level validation with error accumulation.

use serde::{Deserialize, Serialize};

/// A single field-level validation failure.
///
/// Carries a stable machine-readable code (e.g. `Email.InvalidFormat`)
/// and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub code: String,
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// An accumulated set of validation failures.
///
/// Validation is never fail-fast: every violated rule is collected so the
/// caller sees all of them at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// Creates an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an error set holding a single failure.
    pub fn single(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![ValidationError::new(code, message)])
    }

    /// Adds a failure to the set.
    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Merges another set into this one.
    pub fn merge(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    /// Absorbs a validation result: on failure the errors are collected
    /// and `None` is returned, on success the value passes through.
    pub fn absorb<T>(&mut self, result: Result<T, ValidationErrors>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(errors) => {
                self.merge(errors);
                None
            }
        }
    }

    /// Returns true if no failures were collected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of collected failures.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if a failure with the given code was collected.
    pub fn contains(&self, code: &str) -> bool {
        self.0.iter().any(|e| e.code == code)
    }

    /// Iterates over the collected failures.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Converts into the inner list of failures.
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed: ")?;
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", error.code)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_collects_failures_and_passes_values_through() {
        let mut errors = ValidationErrors::new();

        let ok: Result<i32, ValidationErrors> = Ok(42);
        let failed: Result<i32, ValidationErrors> =
            Err(ValidationErrors::single("Field.Invalid", "Field is invalid."));

        assert_eq!(errors.absorb(ok), Some(42));
        assert_eq!(errors.absorb(failed), None);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("Field.Invalid"));
    }

    #[test]
    fn merge_accumulates_all_errors() {
        let mut errors = ValidationErrors::single("A.Required", "A is required.");
        errors.merge(ValidationErrors::single("B.Required", "B is required."));

        assert_eq!(errors.len(), 2);
        assert!(errors.contains("A.Required"));
        assert!(errors.contains("B.Required"));
    }

    #[test]
    fn display_lists_codes() {
        let mut errors = ValidationErrors::single("A.Required", "A is required.");
        errors.push(ValidationError::new("B.TooLong", "B is too long."));

        assert_eq!(errors.to_string(), "validation failed: A.Required, B.TooLong");
    }

    #[test]
    fn empty_set_is_empty() {
        let errors = ValidationErrors::new();
        assert!(errors.is_empty());
        assert_eq!(errors.len(), 0);
    }
}
