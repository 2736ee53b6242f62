use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single chat line. Never changes after construction.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn compose(sender_id: &str, sender_name: &str, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            sender_id: sender_id.to_owned(),
            sender_name: sender_name.to_owned(),
            text: text.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Append-only, insertion-ordered history of every message seen locally.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: Vec<ChatMessage>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.entries.push(message);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<ChatMessage> {
        self.entries.clone()
    }
}
