//! Deterministic collaborators for tests

use crate::alert::{AlertDefinition, Direction};
use async_trait::async_trait;
use metric_source::{FetchError, MetricFetcher};
use metrics_sink::{CycleReport, MetricsSink};
use notifier::{Notification, Notifier, NotifyError};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

pub fn definition(name: &str, threshold: f64, direction: Direction) -> AlertDefinition {
    AlertDefinition {
        name: name.to_string(),
        metric: name.to_string(),
        kind: None,
        threshold,
        direction,
        recipient: "test@example.com".to_string(),
        runbook_link: None,
    }
}

/// Replays canned results in order, repeating the last one forever
pub struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<f64, FetchError>>>,
}

impl ScriptedFetcher {
    pub fn new(responses: Vec<Result<f64, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl MetricFetcher for ScriptedFetcher {
    async fn fetch(&self, _metric: &str) -> Result<f64, FetchError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            return responses.pop_front().unwrap();
        }
        responses
            .front()
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Transport("no scripted response".into())))
    }
}

/// Answers with a fixed value after a delay
pub struct DelayedFetcher {
    delay: Duration,
    value: f64,
}

impl DelayedFetcher {
    pub fn new(delay: Duration, value: f64) -> Self {
        Self { delay, value }
    }
}

#[async_trait]
impl MetricFetcher for DelayedFetcher {
    async fn fetch(&self, _metric: &str) -> Result<f64, FetchError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.value)
    }
}

/// Never answers
pub struct StallingFetcher;

#[async_trait]
impl MetricFetcher for StallingFetcher {
    async fn fetch(&self, _metric: &str) -> Result<f64, FetchError> {
        futures::future::pending().await
    }
}

/// Records every dispatched notification, or refuses all of them
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn dispatch(&self, notification: Notification) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Transport("smtp unavailable".into()));
        }
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    reports: Mutex<Vec<CycleReport>>,
}

impl RecordingSink {
    pub fn reports(&self) -> Vec<CycleReport> {
        self.reports.lock().unwrap().clone()
    }
}

impl MetricsSink for RecordingSink {
    fn publish(&self, report: &CycleReport) {
        self.reports.lock().unwrap().push(report.clone());
    }
}
