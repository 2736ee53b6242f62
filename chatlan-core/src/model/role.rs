use serde::{Deserialize, Serialize};
use std::fmt;

/// Local role in a session, fixed when the session is created.
///
/// The Host is the hub of the star and relays traffic between Guests; a Guest is
/// always a leaf with exactly one link.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Role {
    Host,
    Guest,
}

impl Role {
    pub fn relays(self) -> bool {
        matches!(self, Role::Host)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => f.write_str("host"),
            Role::Guest => f.write_str("guest"),
        }
    }
}
