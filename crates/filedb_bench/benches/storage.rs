//! Storage backend and persistence benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use filedb_bench::populate;
use filedb_core::{Config, Database};
use filedb_storage::{FileBackend, InMemoryBackend, StorageBackend};
use serde_json::json;
use tempfile::tempdir;

/// Benchmark raw blob writes.
fn bench_backend_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("backend_write");
    let dir = tempdir().unwrap();

    for size in [1024, 64 * 1024, 1024 * 1024].iter() {
        let data = vec![b'x'; *size];
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(BenchmarkId::new("memory", size), &data, |b, data| {
            let backend = InMemoryBackend::new();
            backend.ensure_exists("bench").unwrap();
            b.iter(|| backend.write("bench", black_box(data)).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("file", size), &data, |b, data| {
            let backend = FileBackend::open(dir.path().join("raw"), false).unwrap();
            backend.ensure_exists("bench").unwrap();
            b.iter(|| backend.write("bench", black_box(data)).unwrap());
        });
    }
    group.finish();
}

/// Benchmark a full collection save to disk.
fn bench_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("save");
    group.sample_size(20);

    for size in [100, 1_000, 10_000].iter() {
        let dir = tempdir().unwrap();
        let db = Database::open(Config::new().root_dir(dir.path().join("db"))).unwrap();
        let collection = db.collection("bench").unwrap();
        populate(&collection, *size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| collection.save().unwrap());
        });
    }
    group.finish();
}

/// Benchmark inserts with autosave writing every change to disk.
fn bench_autosave_insert(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let config = Config::new().root_dir(dir.path().join("db")).autosave(true);
    let db = Database::open(config).unwrap();
    let collection = db.collection("bench").unwrap();

    c.bench_function("autosave_insert", |b| {
        b.iter(|| {
            collection.insert_one(&json!({ "username": "foo" })).unwrap();
        });
    });
}

criterion_group!(benches, bench_backend_write, bench_save, bench_autosave_insert);

criterion_main!(benches);
