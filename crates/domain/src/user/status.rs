//! Account status state machine.

use serde::{Deserialize, Serialize};

/// The activation state of a user account.
///
/// State transitions:
/// ```text
/// Active ◄──────► Inactive
/// ```
///
/// A freshly created account is `Active`. Transitions that would not change
/// the state are rejected rather than silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AccountStatus {
    /// The account can log in and is visible in listings.
    #[default]
    Active,

    /// The account has been deactivated.
    Inactive,
}

impl AccountStatus {
    /// Returns true if the account is active.
    pub fn is_active(&self) -> bool {
        matches!(self, AccountStatus::Active)
    }

    /// Returns true if the account can be activated.
    pub fn can_activate(&self) -> bool {
        matches!(self, AccountStatus::Inactive)
    }

    /// Returns true if the account can be deactivated.
    pub fn can_deactivate(&self) -> bool {
        matches!(self, AccountStatus::Active)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "Active",
            AccountStatus::Inactive => "Inactive",
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_active() {
        assert_eq!(AccountStatus::default(), AccountStatus::Active);
    }

    #[test]
    fn active_can_only_deactivate() {
        assert!(AccountStatus::Active.can_deactivate());
        assert!(!AccountStatus::Active.can_activate());
    }

    #[test]
    fn inactive_can_only_activate() {
        assert!(AccountStatus::Inactive.can_activate());
        assert!(!AccountStatus::Inactive.can_deactivate());
    }

    #[test]
    fn display() {
        assert_eq!(AccountStatus::Active.to_string(), "Active");
        assert_eq!(AccountStatus::Inactive.to_string(), "Inactive");
    }

    #[test]
    fn serialization_roundtrip() {
        let status = AccountStatus::Inactive;
        let json = serde_json::to_string(&status).unwrap();
        let deserialized: AccountStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, deserialized);
    }
}
