//! Per-IP rate limiting for the status API
//!
//! GCRA via tower_governor, keyed on the peer address. Requires the service
//! to be served with `into_make_service_with_connect_info::<SocketAddr>()`.

use crate::settings::HttpSettings;
use governor::middleware::StateInformationMiddleware;
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;

/// Governor config with X-RateLimit-* headers enabled
pub type StatusGovernorConfig =
    tower_governor::governor::GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Seconds to replenish one request
    pub per_second: u64,
    /// Requests that may be made at once
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 1,
            burst_size: 20,
        }
    }
}

impl From<&HttpSettings> for RateLimitConfig {
    fn from(http: &HttpSettings) -> Self {
        Self {
            per_second: http.rate_limit_per_second,
            burst_size: http.rate_limit_burst,
        }
    }
}

/// Build the governor config, or `None` when either rate is zero
pub fn create_governor_config(config: &RateLimitConfig) -> Option<Arc<StatusGovernorConfig>> {
    GovernorConfigBuilder::default()
        .per_second(config.per_second)
        .burst_size(config.burst_size)
        .use_headers()
        .finish()
        .map(Arc::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert_eq!(config.per_second, 1);
        assert_eq!(config.burst_size, 20);
    }

    #[test]
    fn test_from_http_settings() {
        let http = HttpSettings {
            bind_address: "127.0.0.1:0".into(),
            rate_limit_per_second: 4,
            rate_limit_burst: 2,
        };
        assert_eq!(
            RateLimitConfig::from(&http),
            RateLimitConfig {
                per_second: 4,
                burst_size: 2
            }
        );
    }

    #[test]
    fn test_create_governor_config() {
        assert!(create_governor_config(&RateLimitConfig::default()).is_some());
    }

    #[test]
    fn test_zero_burst_rejected() {
        let config = RateLimitConfig {
            per_second: 1,
            burst_size: 0,
        };
        assert!(create_governor_config(&config).is_none());
    }
}
