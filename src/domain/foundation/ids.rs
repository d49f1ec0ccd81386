//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a persisted dialogue conversation.
///
/// The orchestrator itself never sees this id; it exists for the host
/// application and the conversation store, which key persisted state by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(Uuid);

impl ConversationId {
    /// Creates a new random ConversationId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConversationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(ConversationId::new(), ConversationId::new());
    }

    #[test]
    fn parses_from_display_form() {
        let id = ConversationId::new();
        let parsed: ConversationId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("not-a-uuid".parse::<ConversationId>().is_err());
    }

    #[test]
    fn serializes_as_bare_string() {
        let uuid = Uuid::parse_str("6f1c2b44-1f0e-4f7b-9d8a-0c2f5e3a9b10").unwrap();
        let json = serde_json::to_string(&ConversationId(uuid)).unwrap();
        assert_eq!(json, "\"6f1c2b44-1f0e-4f7b-9d8a-0c2f5e3a9b10\"");
    }
}
