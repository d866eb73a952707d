//! Graphite Render API Client
//!
//! Fetches the last value of a target in Graphite's raw format.

use crate::error::FetchError;
use crate::{extract_last_value, MetricFetcher};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for render requests
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default lookback window for the render request
const DEFAULT_WINDOW: &str = "10mins";

const GRAPH_WIDTH: u32 = 800;
const FGCOLOR: &str = "000000";

/// Time span rendered by a graph link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphSpan {
    /// Last 24 hours, full size
    Daily,
    /// Last 7 days, sparkline
    Weekly,
}

/// Build a Graphite PNG render URL for `metric` with a threshold overlay.
pub fn graph_url(base_url: &str, metric: &str, threshold: f64, span: GraphSpan) -> String {
    match span {
        GraphSpan::Daily => format!(
            "{}?target={}&target=threshold({:.6})&width={}&height=150&bgcolor=FFFFFF\
             &fgcolor={}&hideGrid=true&colorList=%23999999,%23006699&from=-24hours",
            base_url, metric, threshold, GRAPH_WIDTH, FGCOLOR
        ),
        GraphSpan::Weekly => format!(
            "{}?target={}&target=threshold({:.6})&width={}&height=75&hideGrid=true\
             &hideLegend=true&graphOnly=true&hideAxes=true&bgcolor=EEEEEE&fgcolor={}\
             &hideGrid=true&colorList=%23cccccc,%236699cc&from=-7days",
            base_url, metric, threshold, GRAPH_WIDTH, FGCOLOR
        ),
    }
}

/// Fetcher backed by a Graphite `/render` endpoint
pub struct GraphiteFetcher {
    /// Render endpoint (e.g., "http://graphite.local/render/")
    base_url: String,
    /// Lookback window passed as `from=-<window>`
    window: String,
    /// HTTP client with the request timeout applied
    client: reqwest::Client,
}

impl GraphiteFetcher {
    /// Create a new fetcher
    ///
    /// # Arguments
    /// * `base_url` - Render endpoint URL
    /// * `window` - Graphite relative time such as `10mins`
    /// * `timeout` - Upper bound for one request
    pub fn new(base_url: &str, window: &str, timeout: Duration) -> Result<Self, FetchError> {
        info!("Creating Graphite fetcher for {}", base_url);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.to_string(),
            window: window.to_string(),
            client,
        })
    }

    /// Create a fetcher with the default window and timeout
    pub fn with_defaults(base_url: &str) -> Result<Self, FetchError> {
        Self::new(
            base_url,
            DEFAULT_WINDOW,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    fn query(&self, metric: &str) -> [(&'static str, String); 3] {
        [
            ("target", format!("keepLastValue({})", metric)),
            ("format", "raw".to_string()),
            ("from", format!("-{}", self.window)),
        ]
    }
}

#[async_trait]
impl MetricFetcher for GraphiteFetcher {
    async fn fetch(&self, metric: &str) -> Result<f64, FetchError> {
        debug!("Fetching {} from {}", metric, self.base_url);

        let response = self
            .client
            .get(&self.base_url)
            .query(&self.query(metric))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        extract_last_value(&body)
    }
}
