/*!
 * Structured Tracing
 * Subscriber setup and workload spans for the benchmark harness
 *
 * Library code only emits `tracing` events; installing a subscriber is left
 * to binaries and tests through `init_tracing`.
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Workloads slower than this are reported at `warn`
const SLOW_WORKLOAD: Duration = Duration::from_secs(5);

static NEXT_RUN_ID: AtomicU64 = AtomicU64::new(1);

/// Install the global subscriber
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SYNCX_TRACE_JSON: Enable JSON output (default: false)
///
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("SYNCX_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "tracing initialized");
    }
    installed
}

/// Span covering one harness workload
///
/// Records the elapsed time and operation count when dropped.
pub struct WorkloadSpan {
    span: tracing::Span,
    start: Instant,
    run_id: u64,
}

impl WorkloadSpan {
    pub fn new(workload: &str, threads: usize) -> Self {
        let run_id = NEXT_RUN_ID.fetch_add(1, Ordering::Relaxed);

        let span = span!(
            Level::DEBUG,
            "workload",
            run_id,
            workload = workload,
            threads,
            total_ops = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );

        span.in_scope(|| debug!(workload, threads, "workload started"));

        Self {
            span,
            start: Instant::now(),
            run_id,
        }
    }

    /// Process-unique id correlating the events of one run
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn record_ops(&self, total_ops: u64) {
        self.span.record("total_ops", total_ops);
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for WorkloadSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);
        let _entered = self.span.enter();

        if duration > SLOW_WORKLOAD {
            warn!(
                run_id = self.run_id,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow workload"
            );
        } else {
            debug!(
                run_id = self.run_id,
                duration_us = duration.as_micros() as u64,
                "workload completed"
            );
        }
    }
}

/// Create a span for a harness workload
pub fn span_workload(workload: &str, threads: usize) -> WorkloadSpan {
    WorkloadSpan::new(workload, threads)
}
