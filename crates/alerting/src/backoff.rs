//! Escalating notification backoff

use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;

/// Escalating quiet periods indexed by backoff level
pub const BACKOFF_DURATIONS: [Duration; 7] = [
    Duration::from_secs(5 * MINUTE),
    Duration::from_secs(30 * MINUTE),
    Duration::from_secs(HOUR),
    Duration::from_secs(2 * HOUR),
    Duration::from_secs(4 * HOUR),
    Duration::from_secs(8 * HOUR),
    Duration::from_secs(24 * HOUR),
];

const MAX_LEVEL: usize = BACKOFF_DURATIONS.len() - 1;

/// Index into [`BACKOFF_DURATIONS`], saturating at the last entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Backoff {
    level: usize,
}

impl Backoff {
    pub fn level(&self) -> usize {
        self.level
    }

    /// Quiet period for the current level
    pub fn duration(&self) -> Duration {
        BACKOFF_DURATIONS[self.level]
    }

    pub fn advance(&mut self) {
        self.level = (self.level + 1).min(MAX_LEVEL);
    }

    pub fn reset(&mut self) {
        self.level = 0;
    }

    /// End of the quiet period that started at `since`
    pub fn window_end(&self, since: Instant) -> Instant {
        since + self.duration()
    }
}
