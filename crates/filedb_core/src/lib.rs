//! # FileDB Core
//!
//! Embedded JSON document store for FileDB.
//!
//! This crate provides:
//! - Documents with server-assigned ids and timestamps
//! - Collections: named document arrays persisted one blob each
//! - Pattern and closure selectors, patch and transform updaters
//! - Chainable, reusable query results ([`Dataset`])
//! - A lazily-populated catalog of collections ([`Database`])
//!
//! ## Example
//!
//! ```rust
//! use filedb_core::Database;
//! use serde_json::json;
//!
//! let db = Database::open_in_memory();
//! let users = db.collection("users")?;
//!
//! users.insert_many(vec![
//!     json!({ "username": "foo", "favourites": ["Apple", "Pear"] }),
//!     json!({ "username": "bar", "favourites": ["Banana"] }),
//! ])?;
//! users.update_one(json!({ "username": "bar" }), json!({ "favourites": [] }))?;
//!
//! let names = users
//!     .find_many(json!({}))
//!     .sort_by(|a, b| a["username"].as_str().cmp(&b["username"].as_str()))
//!     .select(&["username"])
//!     .value();
//! assert_eq!(names, vec![json!({ "username": "bar" }), json!({ "username": "foo" })]);
//!
//! db.save()?;
//! # Ok::<(), filedb_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod config;
mod database;
mod dataset;
mod document;
mod error;
mod query;

pub use collection::Collection;
pub use config::Config;
pub use database::Database;
pub use dataset::{ChainState, Dataset};
pub use document::{Document, DocumentId, Fields, RESERVED_FIELDS};
pub use error::{CoreError, CoreResult, SaveFailure};
pub use query::{Selector, Updater};

// Re-export storage types for convenience
pub use filedb_storage::{FileBackend, InMemoryBackend, StorageBackend, StorageError};
