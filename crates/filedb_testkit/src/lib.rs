//! # FileDB Testkit
//!
//! Test utilities for FileDB.
//!
//! This crate provides:
//! - Test fixtures and database helpers
//! - Property-based test generators using proptest
//! - Concurrency stress helpers
//!
//! ## Usage
//!
//! ```rust
//! use filedb_testkit::prelude::*;
//! use serde_json::json;
//!
//! with_temp_db(|db| {
//!     let users = db.collection("users").unwrap();
//!     users.insert_one(&json!({ "username": "foo" })).unwrap();
//!     assert_eq!(users.len(), 1);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
