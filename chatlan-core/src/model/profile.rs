use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The local user, as persisted between sessions.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub avatar_color: String,
}

impl UserProfile {
    /// Creates a profile with a fresh short id and a random avatar hue.
    /// Returns `None` for a blank name.
    pub fn new(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let entropy = Uuid::new_v4();
        let hue = entropy.as_u128() % 360;
        let id = entropy.simple().to_string()[..8].to_owned();

        Some(Self {
            id,
            name: name.to_owned(),
            avatar_color: format!("hsl({hue}, 70%, 60%)"),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Es,
}
