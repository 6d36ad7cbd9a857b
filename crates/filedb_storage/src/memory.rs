//! In-memory storage backend for testing.

use crate::backend::{validate_name, StorageBackend};
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-memory storage backend.
///
/// This backend stores all blobs in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral databases that don't need persistence
///
/// The root is modelled explicitly: `deregister_all` removes it, and a
/// second `deregister_all` reports it as missing, just like a directory.
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use filedb_storage::{StorageBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::with_autosave(true);
/// backend.ensure_exists("users").unwrap();
/// backend.autowrite("users", b"[]").unwrap();
/// assert_eq!(backend.blob("users"), Some(b"[]".to_vec()));
/// ```
#[derive(Debug)]
pub struct InMemoryBackend {
    /// `None` once the root has been removed.
    blobs: RwLock<Option<HashMap<String, Vec<u8>>>>,
    autosave: bool,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::with_autosave(false)
    }
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend with autosave disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty in-memory backend with the given autosave policy.
    #[must_use]
    pub fn with_autosave(autosave: bool) -> Self {
        Self {
            blobs: RwLock::new(Some(HashMap::new())),
            autosave,
        }
    }

    /// Returns a copy of the blob stored for `name`, if any.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn blob(&self, name: &str) -> Option<Vec<u8>> {
        self.blobs
            .read()
            .as_ref()
            .and_then(|blobs| blobs.get(name).cloned())
    }

    /// Returns the names of all stored blobs, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .blobs
            .read()
            .as_ref()
            .map(|blobs| blobs.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl StorageBackend for InMemoryBackend {
    fn ensure_exists(&self, name: &str) -> StorageResult<()> {
        validate_name(name)?;
        self.blobs
            .write()
            .get_or_insert_with(HashMap::new)
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    fn read(&self, name: &str) -> StorageResult<Vec<u8>> {
        validate_name(name)?;
        self.blob(name)
            .ok_or_else(|| StorageError::not_found(format!("Blob \"{name}\"")))
    }

    fn write(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        validate_name(name)?;
        let mut blobs = self.blobs.write();
        match blobs.as_mut() {
            Some(blobs) => {
                blobs.insert(name.to_string(), data.to_vec());
                Ok(())
            }
            None => Err(StorageError::not_found("in-memory root")),
        }
    }

    fn autosave_enabled(&self) -> bool {
        self.autosave
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        validate_name(name)?;
        Ok(self
            .blobs
            .read()
            .as_ref()
            .is_some_and(|blobs| blobs.contains_key(name)))
    }

    fn deregister(&self, name: &str) -> StorageResult<()> {
        validate_name(name)?;
        let removed = self
            .blobs
            .write()
            .as_mut()
            .and_then(|blobs| blobs.remove(name));

        match removed {
            Some(_) => Ok(()),
            None => Err(StorageError::not_found(format!("Blob \"{name}\""))),
        }
    }

    fn deregister_all(&self) -> StorageResult<()> {
        match self.blobs.write().take() {
            Some(_) => Ok(()),
            None => Err(StorageError::not_found("in-memory root")),
        }
    }
}
