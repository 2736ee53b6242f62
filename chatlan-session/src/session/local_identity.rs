use chatlan_core::UserProfile;

/// Who the local user is, as stamped on outgoing messages and envelopes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalIdentity {
    pub id: String,
    pub display_name: String,
}

impl LocalIdentity {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

impl From<&UserProfile> for LocalIdentity {
    fn from(profile: &UserProfile) -> Self {
        Self::new(profile.id.clone(), profile.name.clone())
    }
}
