//! Metric Source
//!
//! Retrieves the latest sample for a metric expression. The Graphite
//! render API is the production source; anything implementing
//! [`MetricFetcher`] can stand in for it.

mod error;
mod graphite;

pub use error::FetchError;
pub use graphite::{graph_url, GraphSpan, GraphiteFetcher};

use async_trait::async_trait;

/// Source of the most recent sample for a metric expression
#[async_trait]
pub trait MetricFetcher: Send + Sync {
    /// Fetch the latest value of `metric`
    async fn fetch(&self, metric: &str) -> Result<f64, FetchError>;
}

/// Take the most recent value out of a raw comma separated payload.
///
/// Only the last field counts, so `"1,2"` yields `2.0`. In Graphite's raw
/// format the series header before `|` is skipped. Empty payloads, Graphite's
/// `None` placeholder and non-finite numbers are parse failures.
pub fn extract_last_value(raw: &str) -> Result<f64, FetchError> {
    let trimmed = raw.trim_matches(|c| c == '\n' || c == '\t' || c == ' ');
    let data = trimmed.rsplit('|').next().unwrap_or_default();
    let last = data.rsplit(',').next().unwrap_or_default().trim();

    let value: f64 = last
        .parse()
        .map_err(|_| FetchError::Parse(format!("invalid sample {:?}", last)))?;

    if !value.is_finite() {
        return Err(FetchError::Parse(format!("non-finite sample {:?}", last)));
    }
    Ok(value)
}
