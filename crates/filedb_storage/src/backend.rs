//! Storage backend trait definition.

use crate::error::{StorageError, StorageResult};

/// A named blob store for FileDB collections.
///
/// Storage backends are **opaque byte stores**. Each collection name maps to
/// exactly one blob; FileDB owns the interpretation of the bytes (a JSON
/// array of documents).
///
/// # Invariants
///
/// - `ensure_exists` is idempotent and never truncates an existing blob
/// - `read` returns exactly the bytes passed to the last successful `write`
/// - `write` replaces the whole blob
/// - `autowrite` writes only when autosave was enabled at construction
/// - Backends must be `Send + Sync` so one instance can serve every collection
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Guarantees a blob exists for `name`, creating a zero-length one if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the containing location
    /// cannot be created.
    fn ensure_exists(&self, name: &str) -> StorageResult<()>;

    /// Reads the full contents of the blob for `name`.
    ///
    /// A freshly registered blob reads as empty content, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is missing or an I/O error occurs.
    fn read(&self, name: &str) -> StorageResult<Vec<u8>>;

    /// Overwrites the blob for `name` with `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (disk full, permission denied).
    fn write(&self, name: &str, data: &[u8]) -> StorageResult<()>;

    /// Returns whether this backend was constructed with autosave enabled.
    fn autosave_enabled(&self) -> bool;

    /// Writes `data` only if autosave is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::AutosaveDisabled`] when autosave is off, or any
    /// error `write` would return.
    fn autowrite(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        if self.autosave_enabled() {
            self.write(name, data)
        } else {
            Err(StorageError::AutosaveDisabled)
        }
    }

    /// Returns whether a blob exists for `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or existence cannot be checked.
    fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Removes the blob for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no blob exists for `name`.
    fn deregister(&self, name: &str) -> StorageResult<()>;

    /// Removes the entire backend root and every blob beneath it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the root does not exist.
    fn deregister_all(&self) -> StorageResult<()>;
}

/// Checks that `name` maps to a single blob.
///
/// Names must be non-empty, must not be `.` or `..`, and must not contain
/// path separators or NUL.
///
/// # Errors
///
/// Returns [`StorageError::InvalidName`] for rejected names.
pub fn validate_name(name: &str) -> StorageResult<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(StorageError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}
