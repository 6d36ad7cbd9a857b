//! Database catalog.

use crate::collection::Collection;
use crate::config::Config;
use crate::error::{CoreError, CoreResult, SaveFailure};
use filedb_storage::{FileBackend, InMemoryBackend, StorageBackend};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Per-name initialization slot. `None` until the collection has been opened.
type Slot = Arc<Mutex<Option<Arc<Collection>>>>;

/// The main database handle.
///
/// A `Database` is a registry of [`Collection`]s sharing one storage backend.
/// Collections are opened lazily on first access and stay in the catalog for
/// the lifetime of the handle.
///
/// # Opening a Database
///
/// ```rust
/// use filedb_core::{Config, Database};
/// use serde_json::json;
///
/// # let dir = tempfile::tempdir().unwrap();
/// let db = Database::open(Config::new().root_dir(dir.path().join("db")))?;
///
/// let users = db.collection("users")?;
/// users.insert_one(&json!({ "username": "foo" }))?;
/// db.save()?;
///
/// assert!(dir.path().join("db/users.json").is_file());
/// # Ok::<(), filedb_core::CoreError>(())
/// ```
///
/// # In-Memory Databases
///
/// For testing, use `Database::open_in_memory()`:
///
/// ```rust
/// let db = filedb_core::Database::open_in_memory();
/// assert!(db.collection_names().is_empty());
/// ```
pub struct Database {
    /// Shared storage backend.
    backend: Arc<dyn StorageBackend>,
    /// Collection slots by name.
    slots: Mutex<HashMap<String, Slot>>,
}

impl Database {
    /// Opens a file-backed database described by `config`.
    ///
    /// The root directory is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub fn open(config: Config) -> CoreResult<Self> {
        let backend = FileBackend::open(&config.root_dir, config.autosave)?;
        debug!(root = %config.root_dir.display(), autosave = config.autosave, "opened database");
        Ok(Self::with_backend(Arc::new(backend)))
    }

    /// Creates a database over an existing backend.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory database with autosave disabled.
    #[must_use]
    pub fn open_in_memory() -> Self {
        Self::with_backend(Arc::new(InMemoryBackend::new()))
    }

    /// Returns the shared storage backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Returns the collection called `name`, opening it on first access.
    ///
    /// Concurrent first accesses to the same name open the collection once;
    /// every caller receives the same instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the collection cannot be
    /// loaded. A failed open is retried on the next access.
    pub fn collection(&self, name: &str) -> CoreResult<Arc<Collection>> {
        let slot = Arc::clone(self.slots.lock().entry(name.to_string()).or_default());

        let mut guard = slot.lock();
        if let Some(collection) = guard.as_ref() {
            return Ok(Arc::clone(collection));
        }

        match Collection::open(name, Arc::clone(&self.backend)) {
            Ok(collection) => {
                let collection = Arc::new(collection);
                *guard = Some(Arc::clone(&collection));
                Ok(collection)
            }
            Err(e) => {
                drop(guard);
                self.forget_empty_slot(name, &slot);
                Err(e)
            }
        }
    }

    /// Removes `slot` from the catalog if it is still empty and no other
    /// caller holds it.
    fn forget_empty_slot(&self, name: &str, slot: &Slot) {
        let mut slots = self.slots.lock();
        let unused = slots
            .get(name)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && Arc::strong_count(slot) == 2);
        if unused && slot.try_lock().is_some_and(|guard| guard.is_none()) {
            slots.remove(name);
        }
    }

    /// Returns the names of the collections opened through this handle, sorted.
    ///
    /// Collections that exist in storage but were never accessed are not listed.
    #[must_use]
    pub fn collection_names(&self) -> Vec<String> {
        self.materialized()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Saves every opened collection.
    ///
    /// A failing collection does not stop the others from being saved.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SaveFailed`] listing every collection that failed.
    pub fn save(&self) -> CoreResult<()> {
        let collections = self.materialized();

        let mut failures = Vec::new();
        for collection in &collections {
            if let Err(e) = collection.save() {
                warn!(collection = %collection.name(), error = %e, "failed to save collection");
                failures.push(SaveFailure {
                    collection: collection.name().to_string(),
                    source: Box::new(e),
                });
            }
        }

        if failures.is_empty() {
            debug!(collections = collections.len(), "saved database");
            Ok(())
        } else {
            Err(CoreError::SaveFailed { failures })
        }
    }

    /// Removes the backend root with every collection in it.
    ///
    /// On success the catalog is emptied, so later accesses start from empty
    /// collections instead of resurrecting dropped data. On failure the error
    /// is logged unless `silent` is set. Returns whether the root was removed.
    pub fn drop(&self, silent: bool) -> bool {
        match self.backend.deregister_all() {
            Ok(()) => {
                self.slots.lock().clear();
                debug!("dropped database");
                true
            }
            Err(e) => {
                if !silent {
                    error!(error = %e, "failed to drop database");
                }
                false
            }
        }
    }

    /// Removes one collection's blob and forgets the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if no blob exists for `name` or it cannot be removed.
    pub fn drop_collection(&self, name: &str) -> CoreResult<()> {
        self.backend.deregister(name)?;
        self.slots.lock().remove(name);
        debug!(collection = %name, "dropped collection");
        Ok(())
    }

    /// Opened collections, sorted by name.
    fn materialized(&self) -> Vec<Arc<Collection>> {
        // Clone the slots so no slot is locked while the catalog lock is held.
        let slots: Vec<Slot> = self.slots.lock().values().cloned().collect();

        let mut collections: Vec<Arc<Collection>> =
            slots.iter().filter_map(|slot| slot.lock().clone()).collect();
        collections.sort_by(|a, b| a.name().cmp(b.name()));
        collections
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("autosave", &self.backend.autosave_enabled())
            .field("collections", &self.collection_names())
            .finish_non_exhaustive()
    }
}
