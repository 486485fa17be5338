//! Conversation message types
//!
//! These are shared between the core and the UIs and map one-to-one onto the
//! records written to the saved-memory file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single entry in the conversation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub saved: bool,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, saved: bool) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            saved,
        }
    }
}

/// The sender of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Capitalized form used in prompt lines
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::System => "System",
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
    }

    #[test]
    fn message_round_trips_through_json() {
        let message = Message::new(Role::User, "remember me", true);
        let encoded = serde_json::to_string(&message).unwrap();
        let decoded: Message = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn timestamp_serializes_as_iso8601_string() {
        let message = Message::new(Role::Assistant, "hi", false);
        let value = serde_json::to_value(&message).unwrap();
        let stamp = value["timestamp"].as_str().expect("timestamp should be a string");
        assert!(stamp.contains('T'));
    }
}
