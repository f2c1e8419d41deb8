//! Request-scoped acting principal.

use domain::Role;

/// The acting principal for one request.
///
/// Supplied by the authentication layer and consumed for request-scoped
/// authorization checks and integration-event metadata; this crate never
/// produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    /// The principal's email, or "anonymous" for unauthenticated requests.
    pub email: String,

    /// The principal's role.
    pub role: Role,
}

impl ActorContext {
    /// Creates a context for an authenticated principal.
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
        }
    }

    /// Context for requests with no authenticated principal
    /// (e.g. self-registration).
    pub fn anonymous() -> Self {
        Self {
            email: "anonymous".to_string(),
            role: Role::User,
        }
    }

    /// Returns true if the principal holds an elevated role.
    pub fn is_privileged(&self) -> bool {
        !matches!(self.role, Role::User)
    }

    /// Returns true if the principal may access the record identified by
    /// this email. Non-privileged callers may only access their own.
    pub fn can_access(&self, email: &str) -> bool {
        self.is_privileged() || self.email.eq_ignore_ascii_case(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_user_can_only_access_own_record() {
        let actor = ActorContext::new("john@example.com", Role::User);
        assert!(actor.can_access("john@example.com"));
        assert!(actor.can_access("John@Example.COM"));
        assert!(!actor.can_access("jane@example.com"));
    }

    #[test]
    fn privileged_roles_can_access_any_record() {
        for role in [Role::Admin, Role::Moderator] {
            let actor = ActorContext::new("ops@example.com", role);
            assert!(actor.is_privileged());
            assert!(actor.can_access("jane@example.com"));
        }
    }

    #[test]
    fn anonymous_is_unprivileged() {
        let actor = ActorContext::anonymous();
        assert!(!actor.is_privileged());
        assert_eq!(actor.email, "anonymous");
    }
}
