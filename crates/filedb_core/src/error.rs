//! Error types for FileDB core.

use filedb_storage::StorageError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in FileDB core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON encoding or decoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A payload or persisted value does not have the shape of a document.
    #[error("invalid document: {message}")]
    InvalidDocument {
        /// Description of the problem.
        message: String,
    },

    /// One or more collections failed to save.
    ///
    /// Every collection is attempted; this carries all failures together.
    #[error("failed to save {} collection(s): {}", .failures.len(), summarize(.failures))]
    SaveFailed {
        /// One entry per collection that failed.
        failures: Vec<SaveFailure>,
    },
}

/// A single collection's failure during [`crate::Database::save`].
#[derive(Debug, Error)]
#[error("{collection}: {source}")]
pub struct SaveFailure {
    /// Name of the collection that failed.
    pub collection: String,
    /// The underlying error.
    #[source]
    pub source: Box<CoreError>,
}

fn summarize(failures: &[SaveFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl CoreError {
    /// Creates an invalid document error.
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    /// Returns the storage error, if this is one.
    #[must_use]
    pub fn as_storage(&self) -> Option<&StorageError> {
        match self {
            Self::Storage(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_failed_lists_every_collection() {
        let err = CoreError::SaveFailed {
            failures: vec![
                SaveFailure {
                    collection: "users".into(),
                    source: Box::new(CoreError::invalid_document("boom")),
                },
                SaveFailure {
                    collection: "posts".into(),
                    source: Box::new(StorageError::not_found("Blob \"posts\"").into()),
                },
            ],
        };

        let message = err.to_string();
        assert!(message.starts_with("failed to save 2 collection(s)"));
        assert!(message.contains("users: invalid document: boom"));
        assert!(message.contains("posts: storage error: Blob \"posts\" does not exist"));
    }

    #[test]
    fn storage_errors_convert() {
        let err: CoreError = StorageError::AutosaveDisabled.into();
        assert!(err.as_storage().is_some_and(StorageError::is_autosave_disabled));
    }
}
