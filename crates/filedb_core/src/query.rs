//! Selectors and updaters.
//!
//! Both come in two flavours: a plain JSON object, or a closure for anything
//! the object form cannot express.
//!
//! ```rust
//! use filedb_core::{Selector, Updater};
//! use serde_json::json;
//!
//! let by_name = Selector::from(json!({ "username": "foo" }));
//! let frequent = Selector::predicate(|doc| {
//!     doc.field("favourites")
//!         .and_then(|f| f.as_array())
//!         .is_some_and(|f| f.len() > 1)
//! });
//!
//! let rename = Updater::from(json!({ "username": "bar" }));
//! let clear = Updater::transform(|mut doc| {
//!     doc.remove("favourites");
//!     doc.touch();
//!     doc
//! });
//! # let _ = (by_name, frequent, rename, clear);
//! ```

use crate::document::{timestamp, Document, DocumentId, Fields};
use crate::error::{CoreError, CoreResult};
use serde_json::Value;
use std::fmt;

/// Which documents an operation applies to.
pub enum Selector {
    /// Every key must equal the document's value for that key.
    ///
    /// An empty pattern selects everything. A `null` in the pattern also
    /// matches a document that lacks the key.
    Pattern(Fields),
    /// Arbitrary test over the document.
    Predicate(Box<dyn Fn(&Document) -> bool + Send + Sync>),
}

impl Selector {
    /// Selects every document.
    #[must_use]
    pub fn all() -> Self {
        Self::Pattern(Fields::new())
    }

    /// Selects the document with the given id.
    #[must_use]
    pub fn by_id(id: &DocumentId) -> Self {
        let mut pattern = Fields::new();
        pattern.insert("id".into(), Value::String(id.to_string()));
        Self::Pattern(pattern)
    }

    /// Builds a pattern selector from a JSON value.
    ///
    /// See the `From<Value>` conversion for how non-object values are treated.
    #[must_use]
    pub fn pattern(pattern: Value) -> Self {
        Self::from(pattern)
    }

    /// Selects documents for which `predicate` returns true.
    ///
    /// The predicate runs without any collection lock held, so it may read
    /// from or write to the collection it is selecting from.
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&Document) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Box::new(predicate))
    }

    /// Tests one document.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Self::Pattern(pattern) => pattern.iter().all(|(key, expected)| {
                match document.get(key) {
                    Some(actual) => json_eq(&actual, expected),
                    None => expected.is_null(),
                }
            }),
            Self::Predicate(predicate) => predicate(document),
        }
    }
}

/// Deep JSON equality with numbers compared by value, so `2` equals `2.0`.
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                x.as_f64() == y.as_f64()
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(key, x)| y.get(key).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::all()
    }
}

impl From<Fields> for Selector {
    fn from(pattern: Fields) -> Self {
        Self::Pattern(pattern)
    }
}

/// An object becomes a pattern and `null` selects everything.
/// Any other JSON value can never equal a document and selects nothing.
impl From<Value> for Selector {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(pattern) => Self::Pattern(pattern),
            Value::Null => Self::all(),
            _ => Self::predicate(|_| false),
        }
    }
}

impl From<&DocumentId> for Selector {
    fn from(id: &DocumentId) -> Self {
        Self::by_id(id)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(pattern) => f.debug_tuple("Pattern").field(pattern).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// How matched documents change.
pub enum Updater {
    /// Shallow-merged over the document; must be a JSON object.
    ///
    /// `updatedAt` is refreshed. Reserved keys in the patch are ignored.
    Patch(Value),
    /// Replaces the document with the closure's result.
    ///
    /// `id` and `createdAt` are kept from the original; `updatedAt` is left
    /// to the closure (see [`Document::touch`]).
    Transform(Box<dyn Fn(Document) -> Document + Send + Sync>),
}

impl Updater {
    /// Creates a patch updater.
    #[must_use]
    pub fn patch(patch: Value) -> Self {
        Self::Patch(patch)
    }

    /// Creates a transform updater.
    ///
    /// The closure runs without any collection lock held and may call back
    /// into the collection. If the collection changes the document before the
    /// result is committed, the update is recomputed from the fresh document,
    /// so the closure can run more than once.
    pub fn transform<F>(transform: F) -> Self
    where
        F: Fn(Document) -> Document + Send + Sync + 'static,
    {
        Self::Transform(Box::new(transform))
    }

    /// Fails early on a patch that is not an object, before any document changes.
    pub(crate) fn validate(&self) -> CoreResult<()> {
        match self {
            Self::Patch(Value::Object(_)) | Self::Transform(_) => Ok(()),
            Self::Patch(other) => Err(CoreError::invalid_document(format!(
                "patch must be a JSON object, got {other}"
            ))),
        }
    }

    /// Produces the updated version of `document`.
    pub(crate) fn apply(&self, document: &Document) -> CoreResult<Document> {
        match self {
            Self::Patch(Value::Object(patch)) => {
                let mut updated = document.clone();
                updated.merge(patch);
                updated.touch_at(timestamp::now());
                Ok(updated)
            }
            Self::Patch(_) => {
                self.validate()?;
                Ok(document.clone())
            }
            Self::Transform(transform) => {
                let mut updated = transform(document.clone());
                updated.pin_identity(document);
                updated.normalize();
                Ok(updated)
            }
        }
    }
}

impl From<Value> for Updater {
    fn from(patch: Value) -> Self {
        Self::Patch(patch)
    }
}

impl From<Fields> for Updater {
    fn from(patch: Fields) -> Self {
        Self::Patch(Value::Object(patch))
    }
}

impl fmt::Debug for Updater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patch(patch) => f.debug_tuple("Patch").field(patch).finish(),
            Self::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}
