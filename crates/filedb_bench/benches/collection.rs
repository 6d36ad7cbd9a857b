//! Collection operation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use filedb_bench::{populate, random_user, random_users};
use filedb_core::{Database, Selector};
use serde_json::{json, Value};

/// Benchmark single document inserts.
fn bench_insert_one(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_one");

    for existing in [0, 1_000, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(existing),
            existing,
            |b, &existing| {
                let db = Database::open_in_memory();
                let collection = db.collection("bench").unwrap();
                populate(&collection, existing);
                let user = random_user();

                b.iter(|| {
                    collection.insert_one(black_box(&user)).unwrap();
                });
            },
        );
    }
    group.finish();
}

/// Benchmark batch inserts.
fn bench_insert_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_many");

    for batch_size in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*batch_size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            batch_size,
            |b, &batch_size| {
                let users = random_users(batch_size);

                b.iter(|| {
                    let db = Database::open_in_memory();
                    let collection = db.collection("bench").unwrap();
                    collection.insert_many(black_box(users.clone())).unwrap();
                });
            },
        );
    }
    group.finish();
}

/// Benchmark pattern and predicate scans.
fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_many");

    for size in [100, 1_000, 10_000].iter() {
        let db = Database::open_in_memory();
        let collection = db.collection("bench").unwrap();
        populate(&collection, *size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("pattern", size), size, |b, _| {
            b.iter(|| {
                let result = collection.find_many(black_box(json!({ "age": 42 })));
                black_box(result);
            });
        });

        group.bench_with_input(BenchmarkId::new("predicate", size), size, |b, _| {
            b.iter(|| {
                let result = collection.find_many(Selector::predicate(|user| {
                    user.field("age").and_then(Value::as_i64) >= Some(50)
                }));
                black_box(result);
            });
        });
    }
    group.finish();
}

/// Benchmark a sort-and-select chain.
fn bench_sort_select(c: &mut Criterion) {
    let db = Database::open_in_memory();
    let collection = db.collection("bench").unwrap();
    populate(&collection, 1_000);

    c.bench_function("sort_select_1000", |b| {
        b.iter(|| {
            let names = collection
                .find_many(Selector::all())
                .sort_by(|a, b| a["age"].as_i64().cmp(&b["age"].as_i64()))
                .select(&["username"])
                .value();
            black_box(names);
        });
    });
}

/// Benchmark bulk patch updates.
fn bench_update_many(c: &mut Criterion) {
    let db = Database::open_in_memory();
    let collection = db.collection("bench").unwrap();
    populate(&collection, 1_000);

    c.bench_function("update_many_1000", |b| {
        b.iter(|| {
            let updated = collection
                .update_many(Selector::all(), json!({ "seen": true }))
                .unwrap();
            black_box(updated);
        });
    });
}

criterion_group!(
    benches,
    bench_insert_one,
    bench_insert_many,
    bench_find,
    bench_sort_select,
    bench_update_many,
);

criterion_main!(benches);
