//! Benchmark utilities for FileDB.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use filedb_core::Collection;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Value};

const FRUITS: [&str; 6] = ["Apple", "Banana", "Cherry", "Pear", "Plum", "Kiwi"];

/// Generate a random user document.
pub fn random_user() -> Value {
    let mut rng = rand::thread_rng();
    let count = rng.gen_range(0..=3);
    let favourites: Vec<&str> = FRUITS
        .choose_multiple(&mut rng, count)
        .copied()
        .collect();

    json!({
        "username": format!("user_{:08x}", rng.gen::<u32>()),
        "age": rng.gen_range(1..100),
        "favourites": favourites,
    })
}

/// Generate a batch of random user documents.
pub fn random_users(count: usize) -> Vec<Value> {
    (0..count).map(|_| random_user()).collect()
}

/// Fill a collection with `count` random users.
///
/// # Panics
///
/// Panics if the insert fails.
pub fn populate(collection: &Collection, count: usize) {
    collection
        .insert_many(random_users(count))
        .expect("Failed to populate collection");
}
