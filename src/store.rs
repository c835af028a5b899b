use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Error type for session store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No token is persisted. Expected whenever the user is logged out.
    #[error("no session token stored")]
    NotFound,

    /// The persistence medium itself failed
    #[error("session storage failed: {reason}")]
    Storage { reason: String },
}

impl StoreError {
    fn storage(err: impl std::fmt::Display) -> Self {
        StoreError::Storage {
            reason: err.to_string(),
        }
    }
}

/// Storage for the persisted session token.
///
/// The store owns a single token slot. Absence is reported as
/// `StoreError::NotFound` so callers can tell "logged out" apart from a
/// broken medium without catching panics.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the persisted token
    async fn get(&self) -> Result<String, StoreError>;

    /// Persist a token, replacing any previous one
    async fn set(&self, token: &str) -> Result<(), StoreError>;

    /// Remove the persisted token. Clearing an absent token is success.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// On-disk payload wrapping the token
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionPayload {
    /// The raw session token
    token: String,
    /// When this payload was written
    saved_at: DateTime<Utc>,
}

/// File-backed session store.
///
/// Persists the token as a small JSON document at a fixed path. The whole
/// payload is written in one operation; a failed write leaves the previous
/// file contents in place.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store backed by the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at the default location under the user config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("portal-client").join("session.json"))
    }

    /// The file path backing this store
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self) -> Result<String, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No session file found");
                return Err(StoreError::NotFound);
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read session file");
                return Err(StoreError::storage(e));
            }
        };

        let payload: SessionPayload =
            serde_json::from_str(&raw).map_err(StoreError::storage)?;

        debug!(path = %self.path.display(), "Session token read from file");
        Ok(payload.token)
    }

    async fn set(&self, token: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StoreError::storage)?;
        }

        let payload = SessionPayload {
            token: token.to_string(),
            saved_at: Utc::now(),
        };
        let raw = serde_json::to_string_pretty(&payload).map_err(StoreError::storage)?;

        tokio::fs::write(&self.path, raw)
            .await
            .map_err(StoreError::storage)?;

        info!(path = %self.path.display(), "Session token stored");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!(path = %self.path.display(), "Session token removed");
                Ok(())
            }
            // Already absent counts as cleared
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No session token to remove");
                Ok(())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to remove session file");
                Err(StoreError::storage(e))
            }
        }
    }
}

/// In-memory session store.
///
/// Used by tests as a drop-in fake and by callers that never want the token
/// written to disk.
#[derive(Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self) -> Result<String, StoreError> {
        self.token.read().await.clone().ok_or(StoreError::NotFound)
    }

    async fn set(&self, token: &str) -> Result<(), StoreError> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.token.write().await = None;
        Ok(())
    }
}
