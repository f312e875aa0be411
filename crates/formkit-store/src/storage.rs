#![forbid(unsafe_code)]

//! Key-value storage backends.
//!
//! A [`StorageBackend`] stores one UTF-8 string per key, mirroring browser
//! local storage. Typed access and the never-fail policy live one layer up
//! in [`Collection`](crate::Collection); backends report every failure
//! honestly.
//!
//! | Backend | Lifetime | Notes |
//! |---------|----------|-------|
//! | [`MemoryStorage`] | process | session-scoped, used in tests |
//! | [`FileStorage`] | durable | one JSON file per key, atomic writes |
//! | [`UnavailableStorage`] | n/a | every call fails, models a missing medium |

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Errors reported by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No storage medium is available.
    #[error("storage backend `{0}` is unavailable")]
    Unavailable(String),
    /// I/O failure on a durable medium.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
    /// Stored data could not be encoded or decoded.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A string key-value medium.
///
/// Implementations use interior mutability so a single backend can be shared
/// between the editor and response views.
pub trait StorageBackend: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    /// Read the value stored under `key`, if any.
    fn load(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn store(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Whether the medium can currently be used.
    fn is_available(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// In-memory backend; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        Ok(data.get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// Durable backend writing `<root>/<key>.json`.
///
/// Writes go to a temp file that is then renamed over the target, so a crash
/// never leaves a half-written value behind.
#[derive(Debug)]
pub struct FileStorage {
    root: PathBuf,
    // Serializes temp-file writes for the same key.
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Create a backend rooted at `root`. The directory is created lazily on
    /// first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path used for `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{file}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn name(&self) -> &str {
        "file"
    }

    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        std::fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        let temp = path.with_extension("json.tmp");
        std::fs::write(&temp, value)?;
        std::fs::rename(&temp, &path)?;
        tracing::trace!(key, path = %path.display(), bytes = value.len(), "file storage write");
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn is_available(&self) -> bool {
        !self.root.is_file()
    }
}

// ---------------------------------------------------------------------------
// UnavailableStorage
// ---------------------------------------------------------------------------

/// A backend with no medium behind it, such as a server-side render or a
/// browser with storage disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStorage;

impl StorageBackend for UnavailableStorage {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn load(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Unavailable(self.name().to_string()))
    }

    fn store(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable(self.name().to_string()))
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable(self.name().to_string()))
    }

    fn is_available(&self) -> bool {
        false
    }
}
