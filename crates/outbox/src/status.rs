//! Outbox message delivery status.

use serde::{Deserialize, Serialize};

/// Delivery status of an outbox message.
///
/// Transitions:
/// ```text
/// pending ──► sent                      (terminal, success)
/// pending ──► pending                   (transient failure, attempts += 1)
/// pending ──► dead_letter               (retry budget exhausted, terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    /// Durably committed, not yet delivered to the broker.
    #[default]
    Pending,

    /// Successfully delivered.
    Sent,

    /// Delivery failed after exhausting the retry budget. Requires
    /// operator attention; never retried automatically.
    DeadLetter,
}

impl OutboxStatus {
    /// Returns the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "pending",
            OutboxStatus::Sent => "sent",
            OutboxStatus::DeadLetter => "dead_letter",
        }
    }

    /// Parses a stored status name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OutboxStatus::Pending),
            "sent" => Some(OutboxStatus::Sent),
            "dead_letter" => Some(OutboxStatus::DeadLetter),
            _ => None,
        }
    }

    /// Returns true if no further delivery attempt will be made.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OutboxStatus::Sent | OutboxStatus::DeadLetter)
    }
}

impl std::fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_pending() {
        assert_eq!(OutboxStatus::default(), OutboxStatus::Pending);
    }

    #[test]
    fn as_str_parse_roundtrip() {
        for status in [OutboxStatus::Pending, OutboxStatus::Sent, OutboxStatus::DeadLetter] {
            assert_eq!(OutboxStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OutboxStatus::parse("unknown"), None);
    }

    #[test]
    fn terminal_states() {
        assert!(!OutboxStatus::Pending.is_terminal());
        assert!(OutboxStatus::Sent.is_terminal());
        assert!(OutboxStatus::DeadLetter.is_terminal());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&OutboxStatus::DeadLetter).unwrap();
        assert_eq!(json, "\"dead_letter\"");
    }
}
