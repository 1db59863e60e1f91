/*!
 * Benchmark Harness
 *
 * Runs a fixed number of operations on a fixed number of threads and reports
 * throughput and per-operation latency.
 *
 * # Timing
 *
 * Workers line up on a start barrier and a stop barrier shared with the
 * coordinating thread (`threads + 1` participants). Wall-clock time is taken
 * by the coordinator between the two barriers; each worker also records its
 * own busy time, which feeds the average latency.
 */

pub mod workloads;

use crate::core::sync::env_number;
use crate::monitoring::span_workload;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Barrier;
use std::thread;
use std::time::{Duration, Instant};

/// Harness parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Worker threads per workload (pairs for the queue workload)
    pub threads: usize,
    /// Operations per worker
    pub iterations: usize,
    /// Nesting depth for the reentrant mutex workload
    pub reentrant_depth: usize,
    /// Queue capacity for the queue workload (0 = unbounded)
    pub queue_capacity: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            iterations: 10_000,
            reentrant_depth: 3,
            queue_capacity: 0,
        }
    }
}

impl HarnessConfig {
    /// Defaults overridden by `SYNCX_BENCH_THREADS`, `SYNCX_BENCH_ITERATIONS`,
    /// `SYNCX_BENCH_DEPTH` and `SYNCX_BENCH_QUEUE_CAPACITY`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            threads: env_number("SYNCX_BENCH_THREADS")
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.threads),
            iterations: env_number("SYNCX_BENCH_ITERATIONS")
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.iterations),
            reentrant_depth: env_number("SYNCX_BENCH_DEPTH")
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.reentrant_depth),
            queue_capacity: env_number("SYNCX_BENCH_QUEUE_CAPACITY")
                .unwrap_or(defaults.queue_capacity),
        }
    }
}

/// Result of one `run_workers` call
#[derive(Debug, Clone)]
pub struct Measurement {
    pub label: String,
    pub threads: usize,
    pub iterations: usize,
    pub elapsed: Duration,
    /// Busy time of each worker, by slot
    pub busy: Vec<Duration>,
}

impl Measurement {
    pub fn total_ops(&self) -> u64 {
        (self.threads as u64) * (self.iterations as u64)
    }

    /// Operations per second across all workers
    pub fn throughput_ops(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_ops() as f64 / secs
        } else {
            f64::INFINITY
        }
    }

    /// Mean time per operation, averaged over workers
    pub fn avg_latency(&self) -> Duration {
        if self.busy.is_empty() || self.iterations == 0 {
            return Duration::ZERO;
        }
        let per_worker: f64 = self
            .busy
            .iter()
            .map(|busy| busy.as_secs_f64() / self.iterations as f64)
            .sum();
        Duration::from_secs_f64(per_worker / self.busy.len() as f64)
    }

    pub fn to_record(&self) -> MeasurementRecord {
        MeasurementRecord {
            implementation: self.label.clone(),
            threads: self.threads,
            throughput_ops: self.throughput_ops(),
            avg_latency_s: self.avg_latency().as_secs_f64(),
            elapsed_s: self.elapsed.as_secs_f64(),
        }
    }
}

/// Serializable form of a `Measurement`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub implementation: String,
    pub threads: usize,
    pub throughput_ops: f64,
    pub avg_latency_s: f64,
    pub elapsed_s: f64,
}

/// One benchmark's parameters and results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub benchmark: String,
    pub parameters: HarnessConfig,
    pub results: Vec<MeasurementRecord>,
}

impl Report {
    pub fn new(benchmark: impl Into<String>, parameters: HarnessConfig) -> Self {
        Self {
            benchmark: benchmark.into(),
            parameters,
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, measurement: &Measurement) {
        self.results.push(measurement.to_record());
    }
}

/// Run `op(slot)` `iterations` times on each of `threads` workers
///
/// `slot` is the worker index in `0..threads`, so one workload can give
/// different roles to different workers (readers and writers, producers and
/// consumers).
///
/// A panic in `op` is re-raised on the calling thread once every worker has
/// reached the stop barrier.
pub fn run_workers<F>(label: &str, threads: usize, iterations: usize, op: F) -> Measurement
where
    F: Fn(usize) + Sync,
{
    let span = span_workload(label, threads);
    let start = Barrier::new(threads + 1);
    let stop = Barrier::new(threads + 1);

    let (elapsed, busy) = thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|slot| {
                let (start, stop, op) = (&start, &stop, &op);
                scope.spawn(move || {
                    start.wait();
                    let began = Instant::now();
                    // A panicking op must still reach the stop barrier
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                        for _ in 0..iterations {
                            op(slot);
                        }
                    }));
                    let busy = began.elapsed();
                    stop.wait();
                    outcome.map(|()| busy)
                })
            })
            .collect();

        start.wait();
        let wall_start = Instant::now();
        stop.wait();
        let elapsed = wall_start.elapsed();

        let mut busy = Vec::with_capacity(threads);
        let mut first_panic = None;
        for handle in handles {
            match handle.join() {
                Ok(Ok(worker_busy)) => busy.push(worker_busy),
                Ok(Err(payload)) | Err(payload) => {
                    first_panic.get_or_insert(payload);
                }
            }
        }
        if let Some(payload) = first_panic {
            tracing::error!(label, "workload worker panicked");
            panic::resume_unwind(payload);
        }
        (elapsed, busy)
    });

    let measurement = Measurement {
        label: label.to_string(),
        threads,
        iterations,
        elapsed,
        busy,
    };
    span.record_ops(measurement.total_ops());
    tracing::debug!(
        label,
        throughput = measurement.throughput_ops(),
        avg_latency_ns = measurement.avg_latency().as_nanos() as u64,
        "workload measured"
    );
    measurement
}
