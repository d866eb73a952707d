//! Alerts Collection
//!
//! Drives evaluation cycles over every alert, enforces the per-cycle
//! notification budgets, digests whatever the budgets cut off, and rate
//! limits the aggregate error report with its own backoff.

use crate::alert::{Alert, Status};
use crate::backoff::Backoff;
use crate::board::{AlertSnapshot, StatusBoard};
use chrono::Utc;
use futures::future::join_all;
use metrics_sink::{export_gauges, CycleReport, MetricsSink};
use notifier::{Notification, Notifier};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Collection configuration
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    /// Maximum individual notifications of each category per cycle
    pub global_throttle: usize,
    /// Recipient of digests and error reports
    pub recipient: String,
    /// Sleep between cycles
    pub check_interval: Duration,
    /// Upper bound for one metric fetch
    pub fetch_timeout: Duration,
    /// Graphite render endpoint linked from alert mail, if any
    pub graphite_base: Option<String>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            global_throttle: 10,
            recipient: String::new(),
            check_interval: Duration::from_secs(300),
            fetch_timeout: Duration::from_secs(10),
            graphite_base: None,
        }
    }
}

/// Remaining individual notifications for the current cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationBudget {
    alerts: usize,
    recoveries: usize,
}

impl NotificationBudget {
    pub fn new(alerts: usize, recoveries: usize) -> Self {
        Self { alerts, recoveries }
    }

    /// Consume one alert notification, if any remain
    pub fn take_alert(&mut self) -> bool {
        take(&mut self.alerts)
    }

    /// Consume one recovery notification, if any remain
    pub fn take_recovery(&mut self) -> bool {
        take(&mut self.recoveries)
    }

    pub fn alerts_remaining(&self) -> usize {
        self.alerts
    }
}

fn take(remaining: &mut usize) -> bool {
    if *remaining == 0 {
        return false;
    }
    *remaining -= 1;
    true
}

/// Counters of one cycle; rebuilt from zero every cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleStats {
    pub successes: usize,
    pub failures: usize,
    pub errors: usize,
    pub alerts_sent: usize,
    pub alerts_suppressed: usize,
    pub recoveries: usize,
    pub recoveries_sent: usize,
    /// Error-burst backoff level after the cycle
    pub global_backoff: usize,
    /// Whether an error-burst report went out this cycle
    pub error_report_sent: bool,
}

/// The set of alerts plus the collection-wide throttle state
pub struct AlertsCollection {
    alerts: Vec<Alert>,
    by_fingerprint: HashMap<String, usize>,
    notifier: Arc<dyn Notifier>,
    sink: Arc<dyn MetricsSink>,
    board: StatusBoard,
    config: CollectionConfig,
    /// Error-burst backoff, survives across cycles
    error_backoff: Backoff,
    /// Start of the current error-burst quiet period
    last_error_report: Instant,
}

impl AlertsCollection {
    /// Create an empty collection.
    ///
    /// The error-burst quiet period starts now, so no error report goes out
    /// before the first backoff window has elapsed.
    pub fn new(
        config: CollectionConfig,
        notifier: Arc<dyn Notifier>,
        sink: Arc<dyn MetricsSink>,
        board: StatusBoard,
    ) -> Self {
        info!(
            "Creating alerts collection (budget {}, interval {:?})",
            config.global_throttle, config.check_interval
        );
        Self {
            alerts: Vec::new(),
            by_fingerprint: HashMap::new(),
            notifier,
            sink,
            board,
            config,
            error_backoff: Backoff::default(),
            last_error_report: Instant::now(),
        }
    }

    /// Append an alert; on a fingerprint collision the newest alert wins the lookup
    pub fn add_alert(&mut self, mut alert: Alert) {
        if let Some(base) = &self.config.graphite_base {
            alert.set_graph_base(base);
        }
        let index = self.alerts.len();
        if let Some(previous) = self
            .by_fingerprint
            .insert(alert.fingerprint().to_string(), index)
        {
            warn!(
                fingerprint = alert.fingerprint(),
                replaced = self.alerts[previous].name(),
                by = alert.name(),
                "duplicate alert fingerprint"
            );
        }
        self.alerts.push(alert);
    }

    /// Look up an alert by fingerprint without touching its state
    pub fn get(&self, fingerprint: &str) -> Option<&Alert> {
        self.by_fingerprint
            .get(fingerprint)
            .map(|&index| &self.alerts[index])
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn error_backoff(&self) -> Backoff {
        self.error_backoff
    }

    /// Evaluate every alert.
    ///
    /// Fetches run concurrently, each bounded by the fetch timeout; the
    /// results land on their own alerts so collection order is unaffected.
    pub async fn check_all(&mut self) {
        let timeout = self.config.fetch_timeout;
        let results = join_all(self.alerts.iter_mut().map(|alert| alert.evaluate(timeout))).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        debug!("checked {} alerts, {} fetch errors", results.len(), failed);
    }

    /// Run one full cycle: evaluate, notify within budget, digest, report.
    pub async fn process_all(&mut self) -> CycleStats {
        self.check_all().await;

        let now = Instant::now();
        let budget_size = self.config.global_throttle;
        let mut budget = NotificationBudget::new(budget_size, budget_size);
        let mut stats = CycleStats::default();

        for alert in &mut self.alerts {
            match alert.status() {
                Status::Ok => stats.successes += 1,
                Status::Failed => stats.failures += 1,
                Status::Error => stats.errors += 1,
            }

            let transition = alert.advance_and_notify(&mut budget, self.notifier.as_ref(), now);
            stats.alerts_sent += usize::from(transition.alert_sent);
            stats.alerts_suppressed += usize::from(transition.alert_suppressed);
            stats.recoveries += usize::from(transition.recovered);
            stats.recoveries_sent += usize::from(transition.recovery_sent);
        }

        let attempted = stats.alerts_sent + stats.alerts_suppressed;
        if attempted > 0 && attempted >= budget_size {
            warn!(
                failures = stats.failures,
                budget = budget_size,
                "alert notifications throttled"
            );
            self.dispatch(Notification::Throttled {
                failures: stats.failures,
                budget: budget_size,
                recipient: self.config.recipient.clone(),
            });
        }

        if stats.recoveries > 0 && stats.recoveries >= budget_size {
            warn!(
                recoveries = stats.recoveries,
                budget = budget_size,
                "recovery notifications throttled"
            );
            self.dispatch(Notification::RecoveryThrottled {
                recoveries: stats.recoveries,
                budget: budget_size,
                recipient: self.config.recipient.clone(),
            });
        }

        stats.error_report_sent = self.handle_errors(stats.errors, now);
        stats.global_backoff = self.error_backoff.level();

        self.report(&stats);
        self.publish_status(Some(stats));
        stats
    }

    /// Rate-limited aggregate report of fetch errors.
    ///
    /// Returns whether a report was sent. An error-free cycle resets the
    /// backoff without sending anything.
    fn handle_errors(&mut self, errors: usize, now: Instant) -> bool {
        if errors == 0 {
            self.error_backoff.reset();
            return false;
        }

        let window_end = self.error_backoff.window_end(self.last_error_report);
        if now <= window_end {
            debug!(
                errors,
                level = self.error_backoff.level(),
                "error report still backing off"
            );
            return false;
        }

        warn!(errors, "metrics had fetch errors this cycle");
        self.dispatch(Notification::EncounteredErrors {
            errors,
            recipient: self.config.recipient.clone(),
        });
        self.last_error_report = now;
        self.error_backoff.advance();
        true
    }

    fn dispatch(&self, notification: Notification) {
        if let Err(e) = self.notifier.dispatch(notification) {
            error!(error = %e, "digest notification not sent");
        }
    }

    fn report(&self, stats: &CycleStats) {
        let report = CycleReport {
            alerts_sent: stats.alerts_sent,
            recoveries_sent: stats.recoveries_sent,
            failures: stats.failures,
            errors: stats.errors,
            successes: stats.successes,
            global_backoff: stats.global_backoff,
            global_throttle: self.config.global_throttle,
            timestamp: Utc::now(),
        };
        self.sink.publish(&report);
        export_gauges(&report);
    }

    /// Publish a consistent snapshot of every alert to the status board
    pub fn publish_status(&self, stats: Option<CycleStats>) {
        let snapshots = self.alerts.iter().map(AlertSnapshot::from).collect();
        self.board.publish(snapshots, stats);
    }

    /// Log every alert's current state
    pub fn display_all(&self) {
        for alert in &self.alerts {
            debug!("{}", alert);
        }
    }

    /// Cycle until `cancel` fires.
    ///
    /// Cancellation is observed between cycles and during the sleep; a
    /// cycle already in progress always runs to completion.
    pub async fn run(&mut self, cancel: CancellationToken) {
        info!("Starting evaluation loop over {} alerts", self.alerts.len());
        self.publish_status(None);

        while !cancel.is_cancelled() {
            let stats = self.process_all().await;
            info!(
                successes = stats.successes,
                failures = stats.failures,
                errors = stats.errors,
                alerts_sent = stats.alerts_sent,
                recoveries_sent = stats.recoveries_sent,
                "cycle complete"
            );
            self.display_all();

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.check_interval) => {}
            }
        }

        info!("Evaluation loop stopped");
    }
}
