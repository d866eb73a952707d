//! Alert Implementation
//!
//! One threshold watch over a single metric expression. Each cycle the
//! alert is evaluated (fetch + classify) and then advanced, which decides
//! whether it may notify given its own backoff and the cycle's budget.

use crate::backoff::Backoff;
use crate::collection::NotificationBudget;
use crate::error::AlertError;
use chrono::{DateTime, Utc};
use metric_source::{graph_url, FetchError, GraphSpan, MetricFetcher};
use notifier::{Notification, Notifier};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, warn};

/// Kind label used when a definition carries none
const DEFAULT_KIND: &str = "Alert";

/// Hex characters kept from the fingerprint digest
const FINGERPRINT_LEN: usize = 10;

/// Classification of an alert's latest sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    Failed,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Failed => "Failed",
            Status::Error => "Error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of the threshold that raises the alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Above => "above",
            Direction::Below => "below",
        }
    }

    pub fn inverted(self) -> Self {
        match self {
            Direction::Above => Direction::Below,
            Direction::Below => Direction::Above,
        }
    }

    /// Whether `value` sits on the healthy side of `threshold`.
    ///
    /// The threshold itself belongs to the alarm side in both directions.
    pub fn is_ok(self, value: f64, threshold: f64) -> bool {
        match self {
            Direction::Above => value < threshold,
            Direction::Below => value > threshold,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "above" => Ok(Direction::Above),
            "below" => Ok(Direction::Below),
            _ => Err(AlertError::InvalidDirection(s.to_string())),
        }
    }
}

/// Stable identifier derived from the attributes that define an alert.
///
/// Used for lookup only; it carries no security meaning.
pub fn fingerprint(metric: &str, direction: Direction, threshold: f64, kind: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("metric: {}", metric));
    hasher.update(format!("direction: {}", direction));
    hasher.update(format!("threshold: {:?}", threshold));
    hasher.update(format!("type: {}", kind));

    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(FINGERPRINT_LEN);
    digest
}

fn normalize_metric(metric: &str) -> String {
    metric.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Static definition of one alert, as read from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDefinition {
    pub name: String,
    pub metric: String,
    pub kind: Option<String>,
    pub threshold: f64,
    pub direction: Direction,
    pub recipient: String,
    pub runbook_link: Option<String>,
}

/// Latest sample and its classification, always replaced as a unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub status: Status,
    pub value: f64,
    pub message: String,
}

impl Default for Reading {
    fn default() -> Self {
        Self {
            status: Status::Ok,
            value: 0.0,
            message: String::new(),
        }
    }
}

/// What one call to [`Alert::advance_and_notify`] did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// An individual alert notification was dispatched
    pub alert_sent: bool,
    /// An individual alert was due but the cycle budget was spent
    pub alert_suppressed: bool,
    /// The alert returned to OK this cycle
    pub recovered: bool,
    /// A recovery notification was dispatched
    pub recovery_sent: bool,
}

/// One threshold watch and its runtime state
pub struct Alert {
    name: String,
    metric: String,
    kind: String,
    threshold: f64,
    direction: Direction,
    recipient: String,
    runbook_link: Option<String>,
    fingerprint: String,
    reading: Reading,
    previous_status: Status,
    backoff: Backoff,
    last_notified: Option<Instant>,
    last_notified_at: Option<DateTime<Utc>>,
    /// Graphite render endpoint for the graph links in alert mail
    graph_base: Option<String>,
    fetcher: Arc<dyn MetricFetcher>,
}

impl Alert {
    /// Create an alert in the optimistic OK state
    pub fn new(
        definition: AlertDefinition,
        fetcher: Arc<dyn MetricFetcher>,
    ) -> Result<Self, AlertError> {
        let metric = normalize_metric(&definition.metric);
        if metric.is_empty() {
            return Err(AlertError::EmptyMetric {
                name: definition.name,
            });
        }
        if !definition.threshold.is_finite() {
            return Err(AlertError::InvalidThreshold {
                name: definition.name,
            });
        }

        let kind = definition
            .kind
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_KIND.to_string());
        let fingerprint = fingerprint(&metric, definition.direction, definition.threshold, &kind);

        Ok(Self {
            name: definition.name,
            metric,
            kind,
            threshold: definition.threshold,
            direction: definition.direction,
            recipient: definition.recipient,
            runbook_link: definition.runbook_link,
            fingerprint,
            reading: Reading::default(),
            previous_status: Status::Ok,
            backoff: Backoff::default(),
            last_notified: None,
            last_notified_at: None,
            graph_base: None,
            fetcher,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn runbook_link(&self) -> Option<&str> {
        self.runbook_link.as_deref()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn reading(&self) -> &Reading {
        &self.reading
    }

    pub fn status(&self) -> Status {
        self.reading.status
    }

    pub fn previous_status(&self) -> Status {
        self.previous_status
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    pub fn last_notified_at(&self) -> Option<DateTime<Utc>> {
        self.last_notified_at
    }

    /// Link alert mail to daily and weekly graphs rendered by `base_url`
    pub fn set_graph_base(&mut self, base_url: &str) {
        self.graph_base = Some(base_url.to_string());
    }

    pub fn graph_url(&self, span: GraphSpan) -> Option<String> {
        self.graph_base
            .as_deref()
            .map(|base| graph_url(base, &self.metric, self.threshold, span))
    }

    /// Fetch a fresh sample and classify it.
    ///
    /// A failed fetch marks the alert Error and leaves backoff untouched;
    /// the next cycle is the retry.
    pub async fn evaluate(&mut self, timeout: Duration) -> Result<f64, FetchError> {
        let fetched = match tokio::time::timeout(timeout, self.fetcher.fetch(&self.metric)).await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout)),
        };

        match fetched {
            Ok(value) => {
                self.classify(value);
                Ok(value)
            }
            Err(e) => {
                warn!(alert = %self.name, metric = %self.metric, error = %e, "fetch failed");
                self.reading = Reading {
                    status: Status::Error,
                    value: self.reading.value,
                    message: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Classify `value` against the threshold
    pub fn classify(&mut self, value: f64) {
        let reading = if self.direction.is_ok(value, self.threshold) {
            Reading {
                status: Status::Ok,
                value,
                message: String::new(),
            }
        } else {
            let comparison = match self.direction {
                Direction::Above => ">=",
                Direction::Below => "<=",
            };
            Reading {
                status: Status::Failed,
                value,
                message: format!("{:.6} {} {:.6}", value, comparison, self.threshold),
            }
        };
        self.reading = reading;
    }

    pub fn is_throttled(&self) -> bool {
        self.is_throttled_at(Instant::now())
    }

    /// A level-0 alert is never throttled
    pub fn is_throttled_at(&self, now: Instant) -> bool {
        if self.backoff.level() == 0 {
            return false;
        }
        self.last_notified
            .map(|since| now < self.backoff.window_end(since))
            .unwrap_or(false)
    }

    pub fn just_recovered(&self) -> bool {
        matches!(self.previous_status, Status::Failed | Status::Error)
            && self.reading.status == Status::Ok
    }

    /// Per-cycle transition.
    ///
    /// Sends at most one notification, drawing on the shared `budget`.
    /// Backoff and last-notified advance whenever the alert is non-OK and
    /// out of its quiet period, whether or not anything was sent. Error
    /// status never sends here; the collection reports errors in bulk.
    pub fn advance_and_notify(
        &mut self,
        budget: &mut NotificationBudget,
        notifier: &dyn Notifier,
        now: Instant,
    ) -> Transition {
        let mut transition = Transition::default();

        if self.reading.status == Status::Ok {
            if self.just_recovered() {
                transition.recovered = true;
                if budget.take_recovery() {
                    debug!(alert = %self.name, "sending recovery");
                    self.dispatch(notifier, self.recovery_notification());
                    transition.recovery_sent = true;
                } else {
                    debug!(alert = %self.name, "recovery suppressed by budget");
                }
            }
            self.backoff.reset();
        } else if self.is_throttled_at(now) {
            debug!(
                alert = %self.name,
                level = self.backoff.level(),
                "throttled"
            );
        } else {
            if self.reading.status == Status::Failed {
                if budget.take_alert() {
                    debug!(alert = %self.name, "sending alert");
                    self.dispatch(notifier, self.alert_notification());
                    transition.alert_sent = true;
                } else {
                    debug!(alert = %self.name, "alert suppressed by budget");
                    transition.alert_suppressed = true;
                }
            }
            self.backoff.advance();
            self.last_notified = Some(now);
            self.last_notified_at = Some(Utc::now());
        }

        self.previous_status = self.reading.status;
        transition
    }

    fn dispatch(&self, notifier: &dyn Notifier, notification: Notification) {
        if let Err(e) = notifier.dispatch(notification) {
            error!(alert = %self.name, error = %e, "notification not sent");
        }
    }

    fn alert_notification(&self) -> Notification {
        Notification::Alert {
            name: self.name.clone(),
            metric: self.metric.clone(),
            kind: self.kind.clone(),
            status: self.reading.status.to_string(),
            message: self.reading.message.clone(),
            daily_graph_url: self.graph_url(GraphSpan::Daily),
            weekly_graph_url: self.graph_url(GraphSpan::Weekly),
            runbook_link: self.runbook_link.clone(),
            recipient: self.recipient.clone(),
        }
    }

    fn recovery_notification(&self) -> Notification {
        Notification::Recovery {
            name: self.name.clone(),
            metric: self.metric.clone(),
            returned: self.direction.inverted().to_string(),
            threshold: self.threshold,
            recipient: self.recipient.clone(),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reading.status == Status::Ok {
            return write!(f, "{}\t{} [{}]", self.reading.status, self.name, self.metric);
        }
        let last = self
            .last_notified_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_string());
        write!(
            f,
            "{}\t{} [{}]: {} ({})",
            self.reading.status, self.name, self.metric, self.reading.message, last
        )
    }
}

impl fmt::Debug for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alert")
            .field("name", &self.name)
            .field("fingerprint", &self.fingerprint)
            .field("reading", &self.reading)
            .field("previous_status", &self.previous_status)
            .field("backoff", &self.backoff)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{definition, RecordingNotifier, ScriptedFetcher};
    use proptest::prelude::*;

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn alert_with(values: Vec<Result<f64, FetchError>>) -> Alert {
        Alert::new(
            definition("foo", 10.0, Direction::Above),
            Arc::new(ScriptedFetcher::new(values)),
        )
        .unwrap()
    }

    fn budget() -> NotificationBudget {
        NotificationBudget::new(10, 10)
    }

    #[test]
    fn test_display() {
        let mut alert = alert_with(vec![]);
        assert_eq!(alert.to_string(), "OK\tfoo [foo]");
        alert.classify(11.0);
        assert!(alert.to_string().starts_with("Failed\tfoo [foo]: 11.000000 >= 10.000000"));
    }

    #[test]
    fn test_metric_whitespace_removed() {
        let mut def = definition("foo", 10.0, Direction::Above);
        def.metric = " foo\n\n \t \r".into();
        let alert = Alert::new(def, Arc::new(ScriptedFetcher::new(vec![]))).unwrap();
        assert_eq!(alert.metric(), "foo");
    }

    #[test]
    fn test_definition_validation() {
        let mut def = definition("foo", 10.0, Direction::Above);
        def.metric = " \n".into();
        let err = Alert::new(def, Arc::new(ScriptedFetcher::new(vec![]))).unwrap_err();
        assert!(matches!(err, AlertError::EmptyMetric { .. }));

        let def = definition("foo", f64::NAN, Direction::Above);
        let err = Alert::new(def, Arc::new(ScriptedFetcher::new(vec![]))).unwrap_err();
        assert!(matches!(err, AlertError::InvalidThreshold { .. }));
    }

    #[test]
    fn test_kind_defaults_to_alert() {
        let alert = alert_with(vec![]);
        assert_eq!(alert.kind(), "Alert");

        let mut def = definition("foo", 10.0, Direction::Above);
        def.kind = Some("Notice".into());
        let alert = Alert::new(def, Arc::new(ScriptedFetcher::new(vec![]))).unwrap();
        assert_eq!(alert.kind(), "Notice");
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("above".parse::<Direction>().unwrap(), Direction::Above);
        assert_eq!(" Below ".parse::<Direction>().unwrap(), Direction::Below);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_boundary_is_failed() {
        let mut alert = alert_with(vec![]);
        alert.classify(10.0);
        assert_eq!(alert.status(), Status::Failed);

        let mut def = definition("bar", 10.0, Direction::Below);
        def.metric = "bar".into();
        let mut below = Alert::new(def, Arc::new(ScriptedFetcher::new(vec![]))).unwrap();
        below.classify(10.0);
        assert_eq!(below.status(), Status::Failed);
        assert_eq!(below.reading().message, "10.000000 <= 10.000000");
    }

    #[tokio::test]
    async fn test_fetch_error_sets_error_status() {
        let mut alert = alert_with(vec![Ok(5.0), Err(FetchError::Status(500))]);
        alert.evaluate(TIMEOUT).await.unwrap();
        assert_eq!(alert.status(), Status::Ok);

        assert!(alert.evaluate(TIMEOUT).await.is_err());
        assert_eq!(alert.status(), Status::Error);
        assert_eq!(alert.reading().value, 5.0);
        assert!(alert.reading().message.contains("500"));
        assert_eq!(alert.backoff().level(), 0);
    }

    #[tokio::test]
    async fn test_parse_failure_sets_error_status() {
        let mut alert = alert_with(vec![Err(FetchError::Parse("None".into()))]);
        let err = alert.evaluate(TIMEOUT).await.unwrap_err();
        assert!(err.is_parse_failure());
        assert_eq!(alert.status(), Status::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_fetch_times_out() {
        let mut alert = Alert::new(
            definition("slow", 10.0, Direction::Above),
            Arc::new(crate::testing::StallingFetcher),
        )
        .unwrap();
        let err = alert.evaluate(TIMEOUT).await.unwrap_err();
        assert_eq!(err, FetchError::Timeout(TIMEOUT));
        assert_eq!(alert.status(), Status::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_fail_recover_fail() {
        let notifier = RecordingNotifier::default();
        let mut alert = alert_with(vec![Ok(11.0), Ok(9.0), Ok(11.0)]);

        // cycle 1
        alert.evaluate(TIMEOUT).await.unwrap();
        assert_eq!(alert.status(), Status::Failed);
        let t = alert.advance_and_notify(&mut budget(), &notifier, Instant::now());
        assert!(t.alert_sent);
        assert_eq!(alert.backoff().level(), 1);

        // cycle 2
        alert.evaluate(TIMEOUT).await.unwrap();
        assert_eq!(alert.status(), Status::Ok);
        assert!(alert.just_recovered());
        let t = alert.advance_and_notify(&mut budget(), &notifier, Instant::now());
        assert!(t.recovered && t.recovery_sent);
        assert_eq!(alert.backoff().level(), 0);
        assert!(!alert.just_recovered());

        // cycle 3
        alert.evaluate(TIMEOUT).await.unwrap();
        assert_eq!(alert.status(), Status::Failed);
        let t = alert.advance_and_notify(&mut budget(), &notifier, Instant::now());
        assert!(t.alert_sent);

        let subjects: Vec<_> = notifier.sent().iter().map(|n| n.subject()).collect();
        assert_eq!(subjects, ["[ALERT] foo", "[RECOVERED] foo", "[ALERT] foo"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttled_until_window_expires() {
        let notifier = RecordingNotifier::default();
        let mut alert = alert_with(vec![Ok(11.0)]);
        alert.evaluate(TIMEOUT).await.unwrap();

        let start = Instant::now();
        assert!(!alert.is_throttled_at(start));
        alert.advance_and_notify(&mut budget(), &notifier, start);
        assert_eq!(alert.backoff().level(), 1);

        // level 1 keeps the alert quiet for 30 minutes
        let later = start + Duration::from_secs(29 * 60);
        assert!(alert.is_throttled_at(later));
        let t = alert.advance_and_notify(&mut budget(), &notifier, later);
        assert_eq!(t, Transition::default());
        assert_eq!(alert.backoff().level(), 1);
        assert_eq!(alert.previous_status(), Status::Failed);

        let expired = start + Duration::from_secs(30 * 60);
        assert!(!alert.is_throttled_at(expired));
        let t = alert.advance_and_notify(&mut budget(), &notifier, expired);
        assert!(t.alert_sent);
        assert_eq!(alert.backoff().level(), 2);
        assert_eq!(notifier.sent().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_caps_at_last_level() {
        let notifier = RecordingNotifier::default();
        let mut alert = alert_with(vec![Ok(11.0)]);
        alert.evaluate(TIMEOUT).await.unwrap();

        let mut now = Instant::now();
        for _ in 0..12 {
            alert.advance_and_notify(&mut budget(), &notifier, now);
            now += Duration::from_secs(25 * 3600);
        }
        assert_eq!(alert.backoff().level(), crate::BACKOFF_DURATIONS.len() - 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_status_advances_without_sending() {
        let notifier = RecordingNotifier::default();
        let mut alert = alert_with(vec![Err(FetchError::Transport("refused".into()))]);
        alert.evaluate(TIMEOUT).await.unwrap_err();

        let mut budget = budget();
        let t = alert.advance_and_notify(&mut budget, &notifier, Instant::now());
        assert_eq!(t, Transition::default());
        assert!(notifier.sent().is_empty());
        assert_eq!(alert.backoff().level(), 1);
        assert_eq!(alert.previous_status(), Status::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_from_error() {
        let notifier = RecordingNotifier::default();
        let mut alert = alert_with(vec![Err(FetchError::Status(502)), Ok(1.0)]);

        alert.evaluate(TIMEOUT).await.unwrap_err();
        alert.advance_and_notify(&mut budget(), &notifier, Instant::now());
        alert.evaluate(TIMEOUT).await.unwrap();
        assert!(alert.just_recovered());
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_budget_still_advances() {
        let notifier = RecordingNotifier::default();
        let mut alert = alert_with(vec![Ok(11.0)]);
        alert.evaluate(TIMEOUT).await.unwrap();

        let mut empty = NotificationBudget::new(0, 0);
        let t = alert.advance_and_notify(&mut empty, &notifier, Instant::now());
        assert!(t.alert_suppressed && !t.alert_sent);
        assert!(notifier.sent().is_empty());
        assert_eq!(alert.backoff().level(), 1);
        assert!(alert.last_notified_at().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_notifier_does_not_stop_transition() {
        let notifier = RecordingNotifier::failing();
        let mut alert = alert_with(vec![Ok(11.0)]);
        alert.evaluate(TIMEOUT).await.unwrap();

        let t = alert.advance_and_notify(&mut budget(), &notifier, Instant::now());
        assert!(t.alert_sent);
        assert_eq!(alert.backoff().level(), 1);
        assert_eq!(alert.previous_status(), Status::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_alert_mail_links_graphs() {
        let notifier = RecordingNotifier::default();
        let mut alert = alert_with(vec![Ok(11.0)]);
        assert!(alert.graph_url(GraphSpan::Daily).is_none());

        alert.set_graph_base("http://graphite.local/render/");
        alert.evaluate(TIMEOUT).await.unwrap();
        alert.advance_and_notify(&mut budget(), &notifier, Instant::now());

        let sent = notifier.sent();
        let Notification::Alert {
            daily_graph_url,
            weekly_graph_url,
            ..
        } = &sent[0]
        else {
            panic!("expected an alert, got {:?}", sent[0]);
        };
        assert!(daily_graph_url
            .as_deref()
            .unwrap()
            .starts_with("http://graphite.local/render/?target=foo&target=threshold(10.000000)"));
        assert!(weekly_graph_url.as_deref().unwrap().ends_with("from=-7days"));

        let body = sent[0].body();
        assert!(body.contains("Daily Graph: <http://graphite.local/render/?target=foo"));
        assert!(body.contains("Weekly Graph: <"));
    }

    #[test]
    fn test_fingerprint_known_inputs() {
        let a = fingerprint("foo", Direction::Above, 10.0, "Alert");
        assert_eq!(a.len(), 10);
        assert_eq!(a, fingerprint("foo", Direction::Above, 10.0, "Alert"));
        assert_ne!(a, fingerprint("foo", Direction::Below, 10.0, "Alert"));
        assert_ne!(a, fingerprint("foo", Direction::Above, 10.0, "Notice"));
    }

    proptest! {
        #[test]
        fn prop_classification(threshold in -1.0e6f64..1.0e6, value in -1.0e6f64..1.0e6) {
            let mut above = alert_with(vec![]);
            above.threshold = threshold;
            above.classify(value);
            prop_assert_eq!(above.status() == Status::Ok, value < threshold);

            let mut below = alert_with(vec![]);
            below.direction = Direction::Below;
            below.threshold = threshold;
            below.classify(value);
            prop_assert_eq!(below.status() == Status::Ok, value > threshold);
        }

        #[test]
        fn prop_at_threshold_fails_both_ways(threshold in -1.0e6f64..1.0e6) {
            prop_assert!(!Direction::Above.is_ok(threshold, threshold));
            prop_assert!(!Direction::Below.is_ok(threshold, threshold));
        }

        #[test]
        fn prop_fingerprint_sensitive_to_each_input(
            metric in "[a-z.]{1,20}",
            threshold in -1.0e6f64..1.0e6,
            delta in 0.001f64..100.0,
        ) {
            let base = fingerprint(&metric, Direction::Above, threshold, "Alert");
            prop_assert_eq!(&base, &fingerprint(&metric, Direction::Above, threshold, "Alert"));
            let renamed = format!("{}x", metric);
            prop_assert_ne!(&base, &fingerprint(&renamed, Direction::Above, threshold, "Alert"));
            prop_assert_ne!(&base, &fingerprint(&metric, Direction::Below, threshold, "Alert"));
            let moved = threshold + delta;
            prop_assert_ne!(&base, &fingerprint(&metric, Direction::Above, moved, "Alert"));
            prop_assert_ne!(&base, &fingerprint(&metric, Direction::Above, threshold, "Notice"));
        }
    }
}
