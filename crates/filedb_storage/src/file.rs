//! File-based storage backend for persistent storage.

use crate::backend::{validate_name, StorageBackend};
use crate::error::{StorageError, StorageResult};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default root directory for collection files.
pub const DEFAULT_ROOT_DIR: &str = "./db";

/// File extension of collection files.
pub const COLLECTION_EXT: &str = "json";

/// A file-based storage backend.
///
/// Every collection is stored as a single file under the root directory:
///
/// ```text
/// <root>/
/// ├─ users.json
/// └─ posts.json
/// ```
///
/// # Durability
///
/// `write` replaces a file atomically: the data is written to
/// `<name>.json.tmp`, synced, and renamed over the target. A crash mid-write
/// leaves either the old or the new contents, never a torn file.
///
/// # Thread Safety
///
/// The backend holds no open handles and can be shared across threads.
/// Writers to the same collection are serialized by the collection itself.
///
/// # Example
///
/// ```no_run
/// use filedb_storage::{StorageBackend, FileBackend};
///
/// let backend = FileBackend::open("./db", false).unwrap();
/// backend.ensure_exists("users").unwrap();
/// backend.write("users", br#"[{"username":"foo"}]"#).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
    autosave: bool,
}

impl FileBackend {
    /// Opens a file backend rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Configuration`] if the root cannot be created.
    pub fn open(root: impl AsRef<Path>, autosave: bool) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|source| StorageError::Configuration {
            path: root.clone(),
            source,
        })?;

        debug!(root = %root.display(), autosave, "opened file backend");
        Ok(Self { root, autosave })
    }

    /// Opens a backend at [`DEFAULT_ROOT_DIR`] with autosave disabled.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Configuration`] if the root cannot be created.
    pub fn open_default() -> StorageResult<Self> {
        Self::open(DEFAULT_ROOT_DIR, false)
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path of the file backing collection `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidName`] if `name` is not a valid collection name.
    pub fn collection_path(&self, name: &str) -> StorageResult<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(format!("{name}.{COLLECTION_EXT}")))
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut os = path.as_os_str().to_os_string();
        os.push(".tmp");
        PathBuf::from(os)
    }

    #[cfg(unix)]
    fn sync_root(&self) -> StorageResult<()> {
        File::open(&self.root)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_root(&self) -> StorageResult<()> {
        // NTFS journals directory metadata
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn ensure_exists(&self, name: &str) -> StorageResult<()> {
        let path = self.collection_path(name)?;
        if path.is_file() {
            return Ok(());
        }

        // The root may have been removed by `deregister_all`.
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(())
    }

    fn read(&self, name: &str) -> StorageResult<Vec<u8>> {
        let path = self.collection_path(name)?;
        Ok(fs::read(path)?)
    }

    fn write(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.collection_path(name)?;
        let temp_path = Self::temp_path(&path);

        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &path)?;
        self.sync_root()
    }

    fn autosave_enabled(&self) -> bool {
        self.autosave
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.collection_path(name)?.is_file())
    }

    fn deregister(&self, name: &str) -> StorageResult<()> {
        let path = self.collection_path(name)?;
        if !path.is_file() {
            return Err(StorageError::not_found(format!(
                "File \"{}\"",
                path.display()
            )));
        }

        fs::remove_file(&path)?;
        debug!(path = %path.display(), "removed collection file");
        Ok(())
    }

    fn deregister_all(&self) -> StorageResult<()> {
        if !self.root.is_dir() {
            return Err(StorageError::not_found(format!(
                "Directory \"{}\"",
                self.root.display()
            )));
        }

        fs::remove_dir_all(&self.root)?;
        debug!(root = %self.root.display(), "removed storage root");
        Ok(())
    }
}
