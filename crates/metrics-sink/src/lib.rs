//! Cycle Statistics Export
//!
//! Pushes per-cycle counters to an external time-series store and keeps
//! the exported process gauges current. Delivery is best-effort.

mod carbon;

pub use carbon::{render_plaintext, CarbonSink};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counters of one evaluation cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub alerts_sent: usize,
    pub recoveries_sent: usize,
    pub failures: usize,
    pub errors: usize,
    pub successes: usize,
    /// Error-burst backoff level after the cycle
    pub global_backoff: usize,
    /// Per-cycle notification budget
    pub global_throttle: usize,
    pub timestamp: DateTime<Utc>,
}

/// Destination for cycle statistics.
///
/// `publish` must not block the caller; failures are swallowed.
pub trait MetricsSink: Send + Sync {
    fn publish(&self, report: &CycleReport);
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MetricsSink for NullSink {
    fn publish(&self, _report: &CycleReport) {}
}

/// Update the exported process gauges from a cycle report
pub fn export_gauges(report: &CycleReport) {
    metrics::gauge!("hound_failed").set(report.failures as f64);
    metrics::gauge!("hound_errors").set(report.errors as f64);
    metrics::gauge!("hound_passed").set(report.successes as f64);
    metrics::gauge!("hound_global_throttle").set(report.global_throttle as f64);
    metrics::gauge!("hound_global_backoff").set(report.global_backoff as f64);
}
