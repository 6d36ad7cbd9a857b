//! Document types.

mod id;
mod model;
pub(crate) mod timestamp;

pub use id::DocumentId;
pub use model::{Document, Fields, RESERVED_FIELDS};
