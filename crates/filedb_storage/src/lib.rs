//! # FileDB Storage
//!
//! Storage backend trait and implementations for FileDB.
//!
//! This crate provides the lowest-level storage abstraction for FileDB.
//! Storage backends map a collection name to an **opaque byte blob** - they
//! do not interpret the JSON they store.
//!
//! ## Design Principles
//!
//! - Backends are simple named blob stores (ensure, read, write, remove)
//! - No knowledge of documents, ids or timestamps
//! - Must be `Send + Sync` so one backend can be shared by every collection
//! - FileDB core owns all format interpretation
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral databases
//! - [`FileBackend`] - One `<root>/<name>.json` file per collection
//!
//! ## Example
//!
//! ```rust
//! use filedb_storage::{StorageBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.ensure_exists("users").unwrap();
//! backend.write("users", b"[]").unwrap();
//! assert_eq!(backend.read("users").unwrap(), b"[]");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::{validate_name, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use file::{FileBackend, COLLECTION_EXT, DEFAULT_ROOT_DIR};
pub use memory::InMemoryBackend;
