//! Status board
//!
//! Read path for status display. The evaluation loop publishes a full set
//! of snapshots after every cycle; readers only ever see whole sets.

use crate::alert::{Alert, Direction, Status};
use crate::collection::CycleStats;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

/// Point-in-time view of one alert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertSnapshot {
    pub fingerprint: String,
    pub name: String,
    pub metric: String,
    pub kind: String,
    pub direction: Direction,
    pub threshold: f64,
    pub status: Status,
    pub previous_status: Status,
    pub value: f64,
    pub message: String,
    pub backoff_level: usize,
    pub last_notified: Option<DateTime<Utc>>,
    pub recipient: String,
    pub runbook_link: Option<String>,
}

impl From<&Alert> for AlertSnapshot {
    fn from(alert: &Alert) -> Self {
        let reading = alert.reading();
        Self {
            fingerprint: alert.fingerprint().to_string(),
            name: alert.name().to_string(),
            metric: alert.metric().to_string(),
            kind: alert.kind().to_string(),
            direction: alert.direction(),
            threshold: alert.threshold(),
            status: reading.status,
            previous_status: alert.previous_status(),
            value: reading.value,
            message: reading.message.clone(),
            backoff_level: alert.backoff().level(),
            last_notified: alert.last_notified_at(),
            recipient: alert.recipient().to_string(),
            runbook_link: alert.runbook_link().map(String::from),
        }
    }
}

/// Everything the board holds at one moment
#[derive(Debug, Clone, Default, Serialize)]
pub struct BoardSnapshot {
    /// Alerts in collection order
    pub alerts: Vec<AlertSnapshot>,
    pub last_cycle: Option<CycleStats>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Shared handle to the latest published snapshots
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    inner: Arc<RwLock<BoardSnapshot>>,
}

impl StatusBoard {
    /// Replace the board contents in one step
    pub fn publish(&self, alerts: Vec<AlertSnapshot>, last_cycle: Option<CycleStats>) {
        let mut board = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        board.alerts = alerts;
        if last_cycle.is_some() {
            board.last_cycle = last_cycle;
        }
        board.updated_at = Some(Utc::now());
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Latest snapshot of the alert with `fingerprint`.
    ///
    /// On a collision the alert added last wins, matching the collection.
    pub fn get(&self, fingerprint: &str) -> Option<AlertSnapshot> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .alerts
            .iter()
            .rev()
            .find(|a| a.fingerprint == fingerprint)
            .cloned()
    }

    /// Drop all snapshots, used when a collection is replaced
    pub fn clear(&self) {
        let mut board = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *board = BoardSnapshot::default();
    }
}
