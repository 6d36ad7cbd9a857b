//! Stress helpers for FileDB.
//!
//! These drive a collection from several threads at once to check that
//! autosave writes stay consistent with the in-memory array.

use filedb_core::Database;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        Self {
            total_ops: successful + failed,
            successful_ops: successful,
            failed_ops: failed,
            duration,
        }
    }

    /// Operations per second.
    pub fn ops_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.total_ops as f64 / secs
        } else {
            0.0
        }
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Operations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 200,
            threads: 4,
        }
    }
}

/// Inserts from every thread into one collection, then bumps a counter field
/// on each inserted document.
///
/// Each document is `{ "thread": t, "seq": i, "count": 0 }` before the update.
pub fn stress_concurrent_writes(db: &Database, name: &str, config: &StressConfig) -> StressTestResult {
    let successful = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let record = |ok: bool| {
        let counter = if ok { &successful } else { &failed };
        counter.fetch_add(1, Ordering::Relaxed);
    };

    let start = Instant::now();
    thread::scope(|s| {
        for t in 0..config.threads {
            s.spawn(move || {
                let Ok(collection) = db.collection(name) else {
                    record(false);
                    return;
                };
                for i in 0..config.operations {
                    let inserted = collection.insert_one(&json!({ "thread": t, "seq": i, "count": 0 }));
                    record(inserted.is_ok());

                    if let Ok(document) = inserted {
                        let updated = collection.update_one(document.id(), json!({ "count": 1 }));
                        record(matches!(updated, Ok(Some(_))));
                    }
                }
            });
        }
    });

    StressTestResult::new(
        successful.into_inner(),
        failed.into_inner(),
        start.elapsed(),
    )
}
