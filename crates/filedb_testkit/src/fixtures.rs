//! Test fixtures and database helpers.
//!
//! Provides convenience functions for setting up test databases
//! and common test scenarios.

use filedb_core::{Config, Database};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A test database with automatic cleanup.
pub struct TestDatabase {
    /// The database instance.
    pub db: Database,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: Option<TempDir>,
}

impl TestDatabase {
    /// Creates a new in-memory test database with autosave disabled.
    pub fn memory() -> Self {
        Self {
            db: Database::open_in_memory(),
            temp_dir: None,
        }
    }

    /// Creates a new file-based test database with autosave disabled.
    pub fn file() -> Self {
        Self::file_with(false)
    }

    /// Creates a new file-based test database with autosave enabled.
    pub fn file_with_autosave() -> Self {
        Self::file_with(true)
    }

    fn file_with(autosave: bool) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = Config::new()
            .root_dir(temp_dir.path().join("db"))
            .autosave(autosave);

        let db = Database::open(config).expect("Failed to open file database");

        Self {
            db,
            temp_dir: Some(temp_dir),
        }
    }

    /// Returns the database root if file-based, None if in-memory.
    pub fn root(&self) -> Option<PathBuf> {
        self.temp_dir.as_ref().map(|d| d.path().join("db"))
    }

    /// Returns the path of a collection file if file-based.
    pub fn collection_file(&self, name: &str) -> Option<PathBuf> {
        self.root().map(|root| root.join(format!("{name}.json")))
    }

    /// Reopens the same root with a fresh catalog, as a new process would.
    ///
    /// # Panics
    ///
    /// Panics if the database is in-memory.
    pub fn reopen(&self) -> Database {
        let root = self.root().expect("Only file databases can be reopened");
        let config = Config::new()
            .root_dir(root)
            .autosave(self.db.backend().autosave_enabled());
        Database::open(config).expect("Failed to reopen file database")
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs a test with a temporary in-memory database.
///
/// # Example
///
/// ```rust
/// use filedb_testkit::with_temp_db;
///
/// with_temp_db(|db| {
///     let collection = db.collection("test").unwrap();
///     assert!(collection.is_empty());
/// });
/// ```
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let test_db = TestDatabase::memory();
    f(&test_db.db)
}

/// Runs a test with a temporary file-based database and its root directory.
pub fn with_file_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database, &Path) -> R,
{
    let test_db = TestDatabase::file();
    let root = test_db.root().expect("File database should have a root");
    f(&test_db.db, &root)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use serde_json::{json, Value};

    /// The three users used by the sorting scenarios, favourites of length 2, 1, 1.
    pub fn favourite_users() -> Vec<Value> {
        vec![
            json!({ "username": "foo", "favourites": ["Apple", "Pear"] }),
            json!({ "username": "baz", "favourites": ["Banana"] }),
            json!({ "username": "bar", "favourites": ["Banana"] }),
        ]
    }

    /// Creates a database whose `test` collection holds `count` documents
    /// shaped `{ "index": i }`.
    pub fn populated_database(count: usize) -> TestDatabase {
        let test_db = TestDatabase::memory();
        let collection = test_db.collection("test").expect("Failed to open collection");

        collection
            .insert_many((0..count).map(|i| json!({ "index": i })))
            .expect("Failed to insert documents");

        test_db
    }

    /// Creates a database with `count` collections of one document each.
    pub fn multi_collection_database(count: usize) -> (TestDatabase, Vec<String>) {
        let test_db = TestDatabase::memory();
        let mut names = Vec::with_capacity(count);

        for i in 0..count {
            let name = format!("collection_{i}");
            test_db
                .collection(&name)
                .expect("Failed to open collection")
                .insert_one(&json!({ "collection": i }))
                .expect("Failed to insert document");
            names.push(name);
        }

        (test_db, names)
    }
}
