//! Durable storage configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Event store connection parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct StorageConfig {
    /// Disable durable storage entirely (the sink degrades to a no-op).
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// SQLite connection URL.
    #[validate(custom(function = validation::validate_non_empty))]
    #[serde(default = "default_url")]
    pub url: String,

    /// Connection pool size.
    #[validate(range(min = 1, max = 64))]
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Bound on the initial connection attempt (milliseconds). On
    /// expiry the process starts in degraded mode instead of failing.
    #[validate(range(min = 100, max = 60_000))]
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_enabled() -> bool {
    true
}
fn default_url() -> String {
    "sqlite://falkoga.db?mode=rwc".into()
}
fn default_max_connections() -> u32 {
    5
}
fn default_connect_timeout_ms() -> u64 {
    3000
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            url: default_url(),
            max_connections: default_max_connections(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}
