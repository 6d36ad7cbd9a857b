//! File-backed document collections.
//!
//! Provides [`Collection`], an in-memory document array mirrored to one
//! storage blob, with JSON encoding handled by the `codec` module.

mod codec;
mod ops;

pub use ops::Collection;
