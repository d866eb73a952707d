//! Metric Fetch Error Types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while retrieving a metric sample
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Request could not be delivered or the response body could not be read
    #[error("graphite request failed: {0}")]
    Transport(String),

    /// Metric source answered with a non-success status
    #[error("graphite did not return 200 OK (status {0})")]
    Status(u16),

    /// No answer within the fetch timeout
    #[error("graphite request timed out after {0:?}")]
    Timeout(Duration),

    /// Payload arrived but no numeric sample could be extracted
    #[error("could not extract a value from payload: {0}")]
    Parse(String),
}

impl FetchError {
    /// Whether the payload was present but unusable
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, FetchError::Parse(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None => FetchError::Transport(err.to_string()),
        }
    }
}
