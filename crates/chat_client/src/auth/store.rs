use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chat_core::paths::{credentials_json_path, load_config_json, save_config_json};
use chat_core::User;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Persisted client-side auth state, stored under fixed keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<User>,
}

/// Process-wide holder of the bearer credential and the cached profile.
///
/// `clear` must be idempotent: several failing requests may call it at once.
pub trait CredentialStore: Send + Sync + Debug {
    fn load(&self) -> StoredCredentials;

    fn token(&self) -> Option<String> {
        self.load().auth_token
    }

    fn user(&self) -> Option<User> {
        self.load().user_data
    }

    /// Store a freshly issued credential together with its profile.
    fn save(&self, token: &str, user: Option<&User>) -> Result<()>;

    /// Replace the token, keeping the cached profile (refresh path).
    fn set_token(&self, token: &str) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

fn lock(state: &Mutex<StoredCredentials>) -> MutexGuard<'_, StoredCredentials> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    state: Mutex<StoredCredentials>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(StoredCredentials {
                auth_token: Some(token.into()),
                user_data: None,
            }),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> StoredCredentials {
        lock(&self.state).clone()
    }

    fn save(&self, token: &str, user: Option<&User>) -> Result<()> {
        let mut state = lock(&self.state);
        state.auth_token = Some(token.to_string());
        state.user_data = user.cloned();
        Ok(())
    }

    fn set_token(&self, token: &str) -> Result<()> {
        lock(&self.state).auth_token = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *lock(&self.state) = StoredCredentials::default();
        Ok(())
    }
}

/// JSON-file store that survives restarts.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    state: Mutex<StoredCredentials>,
}

impl FileCredentialStore {
    /// Open (or lazily create) `credentials.json` inside `data_dir`.
    pub fn open(data_dir: &Path) -> Self {
        let path = credentials_json_path(data_dir);
        let state = if path.exists() {
            match load_config_json::<StoredCredentials>(&path) {
                Ok(stored) => stored,
                Err(err) => {
                    warn!("Discarding unreadable credential file: {}", err);
                    StoredCredentials::default()
                }
            }
        } else {
            StoredCredentials::default()
        };
        debug!("Credential store at {:?}", path);
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, state: &StoredCredentials) -> Result<()> {
        save_config_json(&self.path, state).map_err(ClientError::Storage)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> StoredCredentials {
        lock(&self.state).clone()
    }

    fn save(&self, token: &str, user: Option<&User>) -> Result<()> {
        let mut state = lock(&self.state);
        let next = StoredCredentials {
            auth_token: Some(token.to_string()),
            user_data: user.cloned(),
        };
        self.persist(&next)?;
        *state = next;
        Ok(())
    }

    fn set_token(&self, token: &str) -> Result<()> {
        let mut state = lock(&self.state);
        let mut next = state.clone();
        next.auth_token = Some(token.to_string());
        self.persist(&next)?;
        *state = next;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut state = lock(&self.state);
        *state = StoredCredentials::default();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Removed stored credential");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ClientError::Storage(format!(
                "Failed to remove {}: {err}",
                self.path.display()
            ))),
        }
    }
}
