//! Durable client-local key-value storage for the session token.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store persists through the [`TokenStore`] port so production
//! runs against a JSON file on disk while tests substitute [`MemoryStore`].
//! Both backends keep the token under the well-known key [`TOKEN_KEY`];
//! absence of the key means "no session".
//!
//! TRADE-OFFS
//! ==========
//! [`FileStore`] rewrites the whole map on every mutation (temp file + rename).
//! The map holds a handful of entries, so atomicity wins over write volume.

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Key under which the session token is stored.
pub const TOKEN_KEY: &str = "token";

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("storage file {path} is not a JSON string map: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

// =============================================================================
// PORT
// =============================================================================

/// Persistence port for the session token.
///
/// Implementations must be synchronous: the session store calls them inside
/// its critical section so memory and storage change together.
pub trait TokenStore: Send + Sync {
    /// Read the persisted token, if any.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Persist `token`, replacing any previous value.
    fn save(&self, token: &str) -> Result<(), StorageError>;

    /// Remove the persisted token. Removing an absent token is not an error.
    fn clear(&self) -> Result<(), StorageError>;
}

// =============================================================================
// FILE BACKEND
// =============================================================================

/// JSON-object file acting as a small durable key-value store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read one entry from the backing file.
    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut map = self.read_map()?;
        Ok(map.remove(key))
    }

    /// Write one entry, creating the file and its parent directory on demand.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.read_map()?;
        map.insert(key.to_owned(), value.to_owned());
        self.write_map(&map)
    }

    /// Remove one entry. A missing file or key leaves the disk untouched.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.read_map()?;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_map(&map)
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(StorageError::Io { path: self.path.clone(), source }),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt { path: self.path.clone(), source })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source: io::Error| StorageError::Io { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let raw = serde_json::to_string_pretty(map)?;
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, raw).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

impl TokenStore for FileStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        self.get(TOKEN_KEY)
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        self.set(TOKEN_KEY, token)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.remove(TOKEN_KEY)
    }
}

// =============================================================================
// MEMORY BACKEND
// =============================================================================

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token, as if a previous run had logged in.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store.entries().insert(TOKEN_KEY.to_owned(), token.to_owned());
        store
    }

    /// Current value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.get(TOKEN_KEY))
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        self.entries().insert(TOKEN_KEY.to_owned(), token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries().remove(TOKEN_KEY);
        Ok(())
    }
}

impl<T: TokenStore + ?Sized> TokenStore for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<String>, StorageError> {
        (**self).load()
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        (**self).save(token)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}
