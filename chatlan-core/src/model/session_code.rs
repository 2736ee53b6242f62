use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Eight digit code shown to users so they can tell sessions apart.
///
/// Purely informational: it never travels inside a signal token.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SessionCode(u32);

impl SessionCode {
    const MIN: u32 = 10_000_000;
    const SPAN: u32 = 90_000_000;

    pub fn new() -> Self {
        let entropy = Uuid::new_v4().as_u128();
        Self(Self::MIN + (entropy % Self::SPAN as u128) as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for SessionCode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
