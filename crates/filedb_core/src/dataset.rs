//! Chainable view over a query result.

use crate::document::Document;
use crate::error::CoreResult;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Where a [`Dataset`] is in its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// Nothing applied yet; the working copy equals the snapshot.
    Fresh,
    /// At least one transform applied since the last `value()`.
    Transformed,
    /// `value()` was called. The next transform starts over from the snapshot.
    Consumed,
}

/// A materialized query result supporting `select` and `sort_by` chains.
///
/// The dataset keeps the original snapshot next to a working copy. Transforms
/// only touch the working copy, and once `value()` has been read the next
/// transform restarts from the untouched snapshot:
///
/// ```rust
/// use filedb_core::Dataset;
/// use serde_json::json;
///
/// let mut dataset = Dataset::new(vec![
///     json!({ "username": "foo", "age": 3 }),
///     json!({ "username": "bar", "age": 1 }),
/// ]);
///
/// let names = dataset
///     .sort_by(|a, b| a["age"].as_i64().cmp(&b["age"].as_i64()))
///     .select(&["username"])
///     .value();
/// assert_eq!(names, vec![json!({ "username": "bar" }), json!({ "username": "foo" })]);
///
/// // A new chain sees the full documents again.
/// assert_eq!(dataset.select(&["age"]).value()[0], json!({ "age": 3 }));
/// ```
///
/// Comparators passed to [`sort_by`](Self::sort_by) must define a total order.
/// An inconsistent one, such as a comparison that treats missing fields as
/// both smaller and greater, may panic.
#[derive(Debug, Clone)]
pub struct Dataset {
    original: Vec<Value>,
    working: Vec<Value>,
    state: ChainState,
}

impl Dataset {
    /// Wraps a result array.
    #[must_use]
    pub fn new(data: Vec<Value>) -> Self {
        Self {
            working: data.clone(),
            original: data,
            state: ChainState::Fresh,
        }
    }

    pub(crate) fn from_documents<'a>(documents: impl IntoIterator<Item = &'a Document>) -> Self {
        Self::new(documents.into_iter().map(Document::to_json).collect())
    }

    /// Returns the working copy for a new transform, resetting it first if
    /// the previous chain was consumed.
    fn begin_transform(&mut self) -> &mut Vec<Value> {
        if self.state == ChainState::Consumed {
            self.working.clone_from(&self.original);
        }
        self.state = ChainState::Transformed;
        &mut self.working
    }

    /// Keeps only the named fields of every item.
    ///
    /// Fields an item lacks are left out rather than set to `null`; items that
    /// are not objects become empty objects.
    pub fn select<S: AsRef<str>>(&mut self, fields: &[S]) -> &mut Self {
        for item in self.begin_transform().iter_mut() {
            let mut projected = Map::with_capacity(fields.len());
            if let Value::Object(source) = item {
                for field in fields {
                    let field = field.as_ref();
                    if let Some(value) = source.get(field) {
                        projected.insert(field.to_string(), value.clone());
                    }
                }
            }
            *item = Value::Object(projected);
        }
        self
    }

    /// Sorts the items with a three-way comparator. The sort is stable.
    ///
    /// `compare` must be consistent: a total order over every item, missing
    /// fields and mismatched types included. Comparing `Option`s returned by
    /// `Value::as_*` gives one, with absent values first.
    ///
    /// # Panics
    ///
    /// May panic if `compare` does not implement a total order.
    pub fn sort_by<F>(&mut self, compare: F) -> &mut Self
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        self.begin_transform().sort_by(compare);
        self
    }

    /// Returns the current working array and ends the chain.
    pub fn value(&mut self) -> Vec<Value> {
        self.state = ChainState::Consumed;
        self.working.clone()
    }

    /// Like [`value`](Self::value), deserializing each item into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Json`] if an item does not fit `T`.
    pub fn value_as<T: DeserializeOwned>(&mut self) -> CoreResult<Vec<T>> {
        self.value()
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(Into::into))
            .collect()
    }

    /// Consumes the dataset, returning the working array.
    #[must_use]
    pub fn into_value(self) -> Vec<Value> {
        self.working
    }

    /// Returns the untouched snapshot.
    #[must_use]
    pub fn original(&self) -> &[Value] {
        &self.original
    }

    /// Returns the chain state.
    #[must_use]
    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.working.len()
    }

    /// Returns true if the result is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }
}
