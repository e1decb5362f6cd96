//! Durable client-side storage.
//!
//! The web frontend keeps its session, cart and checkout selections in
//! cookies so they survive page reloads. This crate abstracts that as a
//! string key/value store; callers encode JSON payloads. Storage is owned
//! by a single client instance; there is no cross-instance coordination,
//! last writer wins.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Storage keys, one per independently settable artifact.
pub mod keys {
    /// Serialized [`crate::models::UserSession`].
    pub const USER_INFO: &str = "userInfo";

    /// Serialized cart line-item array.
    pub const CART_ITEMS: &str = "cartItems";

    /// Chosen payment method (wire string).
    pub const PAYMENT_METHOD: &str = "paymentMethod";

    /// Dark-mode display preference, `"ON"` or `"OFF"`.
    pub const DARK_MODE: &str = "darkMode";
}

/// Errors raised by the storage backend itself.
///
/// Kept separate from state-transition errors so a failed write is
/// distinguishable from a rejected mutation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding the persisted snapshot failed.
    #[error("storage encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Key/value store with write-through persistence.
///
/// Every mutation is durable before it returns, so a full reload observes
/// the latest value.
pub trait StorageBackend {
    /// Read the value for `key`, if set.
    fn get(&self, key: &str) -> Option<String>;

    /// Set `key` to `value`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the write cannot be made durable.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`; no-op when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the removal cannot be made durable.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage, used in tests and for ephemeral sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

/// File-backed storage: a native client's cookie jar.
///
/// The whole map is kept as one JSON object and rewritten on every
/// mutation.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileStorage {
    /// Open (or create) the store at `path`.
    ///
    /// A missing file yields an empty store; a corrupt file is discarded
    /// with a warning rather than failing the whole client.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when an existing file cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let values = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            match serde_json::from_str(&raw) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Discarding corrupt storage file");
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };
        Ok(Self { path, values })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let encoded = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, encoded)?;
        Ok(())
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_owned(), value.to_owned());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
