//! Alert Definition Errors

use thiserror::Error;

/// Errors raised while building alerts from their definitions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlertError {
    /// Direction is neither `above` nor `below`
    #[error("invalid direction {0:?}, expected \"above\" or \"below\"")]
    InvalidDirection(String),

    /// Threshold is NaN or infinite
    #[error("threshold for {name} must be a finite number")]
    InvalidThreshold { name: String },

    /// Metric expression is empty after whitespace removal
    #[error("alert {name} has an empty metric expression")]
    EmptyMetric { name: String },
}
