//! Key-value persistence for the session slot
//!
//! The session layer only ever touches one key, but the surface is a plain
//! string store so that a browser storage binding, a file directory or a test
//! double can all sit behind it.

use crate::error::{SessionError, SessionResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// String key-value persistence surface
///
/// Writes are atomic single-key operations.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`
    async fn get(&self, key: &str) -> SessionResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> SessionResult<()>;

    /// Remove `key`; succeeds when the key is already absent
    async fn remove(&self, key: &str) -> SessionResult<()>;

    /// Backend name for logs
    fn name(&self) -> &str;
}

/// In-process store
///
/// Clones share the same map, so one clone can outlive a [`crate::SessionStore`]
/// and be handed to the next one to model a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    failing_writes: Option<String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `set` fail with `message`
    #[must_use]
    pub fn with_write_failure(mut self, message: impl Into<String>) -> Self {
        self.failing_writes = Some(message.into());
        self
    }

    /// Seed a raw value, bypassing serialization
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.lock().insert(key.into(), value.into());
    }

    /// Raw value under `key`
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> SessionResult<Option<String>> {
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &str) -> SessionResult<()> {
        if let Some(message) = &self.failing_writes {
            return Err(SessionError::storage(message.clone()));
        }
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> SessionResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Directory-backed store, one file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `directory`; the directory is created on first write
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Root directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> SessionResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(SessionError::storage(format!("invalid storage key '{key}'")));
        }
        Ok(self.directory.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> SessionResult<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> SessionResult<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.directory).await?;

        // Write then rename so readers never see a half-written file
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, value).await?;
        tokio::fs::rename(&staging, &path).await?;
        debug!(path = %path.display(), "Stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> SessionResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &str {
        "file"
    }
}
