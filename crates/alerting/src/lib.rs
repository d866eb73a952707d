//! Alerting System
//!
//! Provides the per-metric threshold state machine, the per-cycle
//! notification budgets, and the error-burst backoff that keeps a
//! systemic outage from turning into a notification storm.

mod alert;
mod backoff;
mod board;
mod collection;
mod error;

#[cfg(test)]
mod testing;

pub use alert::{fingerprint, Alert, AlertDefinition, Direction, Reading, Status, Transition};
pub use backoff::{Backoff, BACKOFF_DURATIONS};
pub use board::{AlertSnapshot, BoardSnapshot, StatusBoard};
pub use collection::{AlertsCollection, CollectionConfig, CycleStats, NotificationBudget};
pub use error::AlertError;
