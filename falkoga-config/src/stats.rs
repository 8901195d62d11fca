//! Statistics aggregation configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Aggregator cadences and windows.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct StatsConfig {
    /// In-memory snapshot refresh cadence (seconds).
    #[validate(range(min = 1, max = 60))]
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Cadence of the live-rate decay step (milliseconds).
    #[validate(range(min = 100, max = 10_000))]
    #[serde(default = "default_decay_interval_ms")]
    pub decay_interval_ms: u64,

    /// Multiplicative decay applied to the live rate each step. An
    /// approximation of a sliding window; the exact constant is not
    /// load-bearing.
    #[validate(custom(function = validation::validate_decay_factor))]
    #[serde(default = "default_decay_factor")]
    pub decay_factor: f64,

    /// Bound on the in-memory recent-event buffer.
    #[validate(range(min = 100, max = 1_000_000))]
    #[serde(default = "default_memory_window")]
    pub memory_window: usize,

    /// Leaderboard size for top source/target countries.
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_top_n")]
    pub top_n: u32,
}

fn default_refresh_interval_secs() -> u64 {
    2
}
fn default_decay_interval_ms() -> u64 {
    1000
}
fn default_decay_factor() -> f64 {
    0.5
}
fn default_memory_window() -> usize {
    10_000
}
fn default_top_n() -> u32 {
    10
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            decay_interval_ms: default_decay_interval_ms(),
            decay_factor: default_decay_factor(),
            memory_window: default_memory_window(),
            top_n: default_top_n(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_config_is_valid() {
        StatsConfig::default()
            .validate()
            .expect("Default config should be valid");
    }

    #[test]
    fn decay_factor_must_stay_inside_unit_interval() {
        let mut config = StatsConfig::default();
        config.decay_factor = 1.0;
        assert!(config.validate().is_err());
        config.decay_factor = 0.0;
        assert!(config.validate().is_err());
        config.decay_factor = 0.25;
        assert!(config.validate().is_ok());
    }
}
