//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random documents and operations
//! that keep clear of the server-assigned fields.

use filedb_core::RESERVED_FIELDS;
use proptest::prelude::*;
use serde_json::{Map, Value};

/// Strategy for generating valid collection names.
pub fn collection_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_-]{0,31}").expect("Invalid regex")
}

/// Strategy for generating user field names, never a reserved one.
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-zA-Z0-9]{0,11}")
        .expect("Invalid regex")
        .prop_filter("Field name must not be reserved", |s| {
            !RESERVED_FIELDS.contains(&s.as_str())
        })
}

/// Strategy for scalar JSON values.
///
/// Floats are half steps: they parse back exactly and are never integral,
/// since integral floats are stored as integers.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<i32>().prop_map(|n| Value::from(f64::from(n) + 0.5)),
        "[ -~]{0,16}".prop_map(Value::String),
    ]
}

/// Strategy for JSON values nested up to a few levels deep.
pub fn json_value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Strategy for insert payloads: JSON objects without reserved keys.
pub fn document_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(field_name_strategy(), json_value_strategy(), 0..6)
        .prop_map(|fields| Value::Object(fields.into_iter().collect::<Map<_, _>>()))
}

/// Strategy for patch updaters.
///
/// Patches sometimes carry reserved keys, which must be ignored.
pub fn patch_strategy() -> impl Strategy<Value = Value> {
    (
        document_strategy(),
        prop::option::of(prop::sample::select(RESERVED_FIELDS.to_vec())),
    )
        .prop_map(|(mut patch, reserved)| {
            if let (Value::Object(fields), Some(key)) = (&mut patch, reserved) {
                fields.insert(key.to_string(), Value::String("forged".into()));
            }
            patch
        })
}

/// A collection operation for model-based tests.
#[derive(Debug, Clone)]
pub enum CollectionOperation {
    /// Insert a document.
    Insert {
        /// Payload.
        document: Value,
    },
    /// Patch the document at `index` (modulo the collection length).
    Update {
        /// Target position.
        index: usize,
        /// Patch.
        patch: Value,
    },
    /// Delete the document at `index` (modulo the collection length).
    Delete {
        /// Target position.
        index: usize,
    },
}

/// Strategy for generating collection operations.
pub fn collection_operation_strategy() -> impl Strategy<Value = CollectionOperation> {
    prop_oneof![
        3 => document_strategy().prop_map(|document| CollectionOperation::Insert { document }),
        2 => (any::<usize>(), patch_strategy())
            .prop_map(|(index, patch)| CollectionOperation::Update { index, patch }),
        1 => any::<usize>().prop_map(|index| CollectionOperation::Delete { index }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<CollectionOperation>> {
    prop::collection::vec(collection_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
