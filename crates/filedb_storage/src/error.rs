//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred while reading or writing a blob.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backend root could not be created.
    #[error("cannot create storage root {}: {source}", path.display())]
    Configuration {
        /// The root location that could not be created.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A blob or the backend root does not exist.
    #[error("{target} does not exist")]
    NotFound {
        /// Human readable description of what was missing.
        target: String,
    },

    /// `autowrite` was called on a backend constructed without autosave.
    ///
    /// This is not a fault; collections treat it as a no-op.
    #[error("data has not been written as autosave is not enabled")]
    AutosaveDisabled,

    /// The collection name cannot be mapped to a single blob.
    #[error("invalid collection name: {name:?}")]
    InvalidName {
        /// The rejected name.
        name: String,
    },
}

impl StorageError {
    /// Creates a not found error.
    pub fn not_found(target: impl Into<String>) -> Self {
        Self::NotFound {
            target: target.into(),
        }
    }

    /// Returns true for the autosave-disabled sentinel.
    #[must_use]
    pub fn is_autosave_disabled(&self) -> bool {
        matches!(self, Self::AutosaveDisabled)
    }

    /// Returns true if the error reports a missing blob or root.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
