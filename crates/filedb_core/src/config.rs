//! Database configuration.

use filedb_storage::DEFAULT_ROOT_DIR;
use std::path::PathBuf;

/// Configuration for opening a file-backed database.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one `<name>.json` file per collection.
    pub root_dir: PathBuf,

    /// Whether every insert, update and delete is persisted immediately.
    ///
    /// When disabled, data reaches disk only on an explicit `save`.
    pub autosave: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            autosave: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory.
    #[must_use]
    pub fn root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    /// Sets whether mutations are persisted immediately.
    #[must_use]
    pub const fn autosave(mut self, value: bool) -> Self {
        self.autosave = value;
        self
    }
}
