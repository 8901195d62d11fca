//! Batch sink configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sink parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct SinkConfig {
    /// Interval between buffer flushes to durable storage (seconds).
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: u64,
}

fn default_flush_interval_secs() -> u64 {
    5
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            flush_interval_secs: default_flush_interval_secs(),
        }
    }
}
