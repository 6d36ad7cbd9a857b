//! The stored document shape.

use crate::document::id::DocumentId;
use crate::document::timestamp;
use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// A free-form attribute bag.
pub type Fields = Map<String, Value>;

/// Field names managed by the collection. They are ignored in insert
/// payloads and patches.
pub const RESERVED_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// A schemaless record with reserved identity and timestamp fields.
///
/// Serialized as one flat JSON object:
///
/// ```json
/// {"id":"…","createdAt":"2020-10-18T09:30:00.123Z","updatedAt":"…","username":"foo"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    id: DocumentId,
    #[serde(with = "crate::document::timestamp")]
    created_at: DateTime<Utc>,
    #[serde(with = "crate::document::timestamp")]
    updated_at: DateTime<Utc>,
    #[serde(flatten)]
    fields: Fields,
}

fn is_reserved(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}

/// Largest magnitude at which every integer is exactly representable as `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Rewrites integral floats such as `2.0` as integers, recursively.
///
/// JSON has a single number type, so `2.0` and `2` are the same value and are
/// stored as `2`.
fn normalize_numbers(value: &mut Value) {
    if let Some(integer) = integral_float(value) {
        *value = Value::from(integer);
        return;
    }
    match value {
        Value::Array(items) => items.iter_mut().for_each(normalize_numbers),
        Value::Object(fields) => fields.values_mut().for_each(normalize_numbers),
        _ => {}
    }
}

#[allow(clippy::cast_possible_truncation)]
fn integral_float(value: &Value) -> Option<i64> {
    let float = value.as_f64().filter(|_| value.is_f64())?;
    (float.fract() == 0.0 && float.abs() <= MAX_SAFE_INTEGER).then_some(float as i64)
}

impl Document {
    /// Builds a freshly inserted document. Reserved keys in `fields` are dropped.
    pub(crate) fn create(id: DocumentId, mut fields: Fields, now: DateTime<Utc>) -> Self {
        fields.retain(|key, _| !is_reserved(key));
        let mut document = Self {
            id,
            created_at: now,
            updated_at: now,
            fields,
        };
        document.normalize();
        document
    }

    /// Converts a serializable value into an attribute bag.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDocument`] if `value` does not serialize to
    /// a JSON object.
    pub fn fields_from<T: Serialize + ?Sized>(value: &T) -> CoreResult<Fields> {
        match serde_json::to_value(value)? {
            Value::Object(fields) => Ok(fields),
            other => Err(CoreError::invalid_document(format!(
                "expected a JSON object, got {}",
                kind(&other)
            ))),
        }
    }

    /// Returns the document id.
    #[must_use]
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Returns when the document was inserted.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the document was last updated.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the user fields, without the reserved ones.
    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Returns a user field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns any field, reserved ones included, as JSON.
    ///
    /// Timestamps are returned in their serialized ISO-8601 form.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Cow<'_, Value>> {
        match key {
            "id" => Some(Cow::Owned(Value::String(self.id.to_string()))),
            "createdAt" => Some(Cow::Owned(Value::String(timestamp::format(&self.created_at)))),
            "updatedAt" => Some(Cow::Owned(Value::String(timestamp::format(&self.updated_at)))),
            _ => self.fields.get(key).map(Cow::Borrowed),
        }
    }

    /// Sets a user field, returning the previous value.
    ///
    /// Reserved keys are left untouched and `None` is returned.
    /// Integral floats in `value` are stored as integers.
    pub fn insert(&mut self, key: impl Into<String>, mut value: Value) -> Option<Value> {
        let key = key.into();
        if is_reserved(&key) {
            return None;
        }
        normalize_numbers(&mut value);
        self.fields.insert(key, value)
    }

    /// Removes a user field, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    /// Refreshes `updatedAt` to the current instant.
    ///
    /// Transform updaters own the timestamp; call this from one to record
    /// the change.
    pub fn touch(&mut self) {
        self.touch_at(timestamp::now());
    }

    /// Never moves `updatedAt` backwards, even if the clock does.
    pub(crate) fn touch_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(now);
    }

    /// Shallow-merges `patch` over the user fields. Reserved keys are ignored.
    pub(crate) fn merge(&mut self, patch: &Fields) {
        for (key, value) in patch {
            if !is_reserved(key) {
                let mut value = value.clone();
                normalize_numbers(&mut value);
                self.fields.insert(key.clone(), value);
            }
        }
    }

    /// Normalizes every user field's numbers.
    pub(crate) fn normalize(&mut self) {
        self.fields.values_mut().for_each(normalize_numbers);
    }

    /// Restores identity fields from `original` after a transform.
    pub(crate) fn pin_identity(&mut self, original: &Document) {
        self.id = original.id.clone();
        self.created_at = original.created_at;
    }

    /// Returns the document as a flat JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + RESERVED_FIELDS.len());
        object.insert("id".into(), Value::String(self.id.to_string()));
        object.insert("createdAt".into(), Value::String(timestamp::format(&self.created_at)));
        object.insert("updatedAt".into(), Value::String(timestamp::format(&self.updated_at)));
        for (key, value) in &self.fields {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }

    /// Deserializes the whole document, reserved fields included, into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Json`] if the document does not fit `T`.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> CoreResult<T> {
        Ok(serde_json::from_value(self.to_json())?)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
