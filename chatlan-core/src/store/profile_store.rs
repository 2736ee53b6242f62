use crate::error::ProfileStoreError;
use crate::model::{Language, UserProfile};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Where the local profile and language preference live between runs.
pub trait ProfileStore: Send + Sync {
    fn profile(&self) -> Result<Option<UserProfile>, ProfileStoreError>;

    fn set_profile(&self, profile: &UserProfile) -> Result<(), ProfileStoreError>;

    fn language(&self) -> Result<Language, ProfileStoreError>;

    fn set_language(&self, language: Language) -> Result<(), ProfileStoreError>;

    /// Forget everything (sign out).
    fn clear(&self) -> Result<(), ProfileStoreError>;
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StoredState {
    #[serde(default)]
    profile: Option<UserProfile>,
    #[serde(default)]
    language: Language,
}

/// Keeps everything in one small JSON file.
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoredState, ProfileStoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredState::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, state: &StoredState) -> Result<(), ProfileStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(state)?)?;
        debug!("Profile store written to {}", self.path.display());
        Ok(())
    }
}

impl ProfileStore for JsonProfileStore {
    fn profile(&self) -> Result<Option<UserProfile>, ProfileStoreError> {
        Ok(self.load()?.profile)
    }

    fn set_profile(&self, profile: &UserProfile) -> Result<(), ProfileStoreError> {
        let mut state = self.load()?;
        state.profile = Some(profile.clone());
        self.save(&state)
    }

    fn language(&self) -> Result<Language, ProfileStoreError> {
        Ok(self.load()?.language)
    }

    fn set_language(&self, language: Language) -> Result<(), ProfileStoreError> {
        let mut state = self.load()?;
        state.language = language;
        self.save(&state)
    }

    fn clear(&self) -> Result<(), ProfileStoreError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryProfileStore {
    state: Mutex<StoredState>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut StoredState) -> T) -> T {
        let mut guard = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl ProfileStore for MemoryProfileStore {
    fn profile(&self) -> Result<Option<UserProfile>, ProfileStoreError> {
        Ok(self.with_state(|s| s.profile.clone()))
    }

    fn set_profile(&self, profile: &UserProfile) -> Result<(), ProfileStoreError> {
        self.with_state(|s| s.profile = Some(profile.clone()));
        Ok(())
    }

    fn language(&self) -> Result<Language, ProfileStoreError> {
        Ok(self.with_state(|s| s.language))
    }

    fn set_language(&self, language: Language) -> Result<(), ProfileStoreError> {
        self.with_state(|s| s.language = language);
        Ok(())
    }

    fn clear(&self) -> Result<(), ProfileStoreError> {
        self.with_state(|s| *s = StoredState::default());
        Ok(())
    }
}
