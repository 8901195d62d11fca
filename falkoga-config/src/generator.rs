//! Event generator configuration.
//!
//! Controls the two independent emission schedules (steady base rate and
//! randomized burst episodes) plus per-event synthesis parameters.

use serde::{Deserialize, Serialize};
use validator::{self, Validate, ValidationError};

/// Generator configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[validate(schema(function = validate_batch_range))]
pub struct GeneratorConfig {
    /// Base-rate tick interval (milliseconds). Burst sub-ticks reuse it.
    #[validate(range(min = 100, max = 60_000))]
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Minimum events per base-rate tick.
    #[validate(range(min = 1, max = 1000))]
    #[serde(default = "default_batch_min")]
    pub batch_min: u32,

    /// Maximum events per base-rate tick.
    #[validate(range(min = 1, max = 1000))]
    #[serde(default = "default_batch_max")]
    pub batch_max: u32,

    /// Coordinate jitter around country centroids (± degrees).
    #[validate(range(min = 0.0, max = 10.0))]
    #[serde(default = "default_jitter_degrees")]
    pub jitter_degrees: f64,

    /// Bound on target-country resampling before treating the weight
    /// table as defective.
    #[validate(range(min = 1, max = 10_000))]
    #[serde(default = "default_target_retry_limit")]
    pub target_retry_limit: u32,

    /// Burst episode parameters.
    #[validate(nested)]
    #[serde(default)]
    pub burst: BurstConfig,
}

fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_batch_min() -> u32 {
    2
}
fn default_batch_max() -> u32 {
    5
}
fn default_jitter_degrees() -> f64 {
    2.0
}
fn default_target_retry_limit() -> u32 {
    64
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            batch_min: default_batch_min(),
            batch_max: default_batch_max(),
            jitter_degrees: default_jitter_degrees(),
            target_retry_limit: default_target_retry_limit(),
            burst: BurstConfig::default(),
        }
    }
}

fn validate_batch_range(config: &GeneratorConfig) -> Result<(), ValidationError> {
    if config.batch_min > config.batch_max {
        return Err(ValidationError::new("batch_min_exceeds_batch_max"));
    }
    Ok(())
}

/// Burst episode configuration: after a randomized delay, a larger total
/// of forced-ddos events is spread evenly over several sub-ticks.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[validate(schema(function = validate_burst_ranges))]
pub struct BurstConfig {
    /// Minimum delay before the next episode (seconds).
    #[validate(range(min = 1, max = 86_400))]
    #[serde(default = "default_min_delay_secs")]
    pub min_delay_secs: u64,

    /// Maximum delay before the next episode (seconds).
    #[validate(range(min = 1, max = 86_400))]
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,

    /// Minimum total events per episode.
    #[validate(range(min = 1, max = 100_000))]
    #[serde(default = "default_min_total")]
    pub min_total: u32,

    /// Maximum total events per episode.
    #[validate(range(min = 1, max = 100_000))]
    #[serde(default = "default_max_total")]
    pub max_total: u32,

    /// Sub-ticks an episode is spread across.
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_ticks")]
    pub ticks: u32,
}

fn default_min_delay_secs() -> u64 {
    30
}
fn default_max_delay_secs() -> u64 {
    120
}
fn default_min_total() -> u32 {
    20
}
fn default_max_total() -> u32 {
    50
}
fn default_ticks() -> u32 {
    5
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: default_min_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
            min_total: default_min_total(),
            max_total: default_max_total(),
            ticks: default_ticks(),
        }
    }
}

fn validate_burst_ranges(config: &BurstConfig) -> Result<(), ValidationError> {
    if config.min_delay_secs > config.max_delay_secs {
        return Err(ValidationError::new("burst_delay_range_inverted"));
    }
    if config.min_total > config.max_total {
        return Err(ValidationError::new("burst_total_range_inverted"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_generator_config_is_valid() {
        GeneratorConfig::default()
            .validate()
            .expect("Default config should be valid");
    }

    #[test]
    fn inverted_batch_range_is_rejected() {
        let mut config = GeneratorConfig::default();
        config.batch_min = 9;
        config.batch_max = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_burst_window_is_rejected() {
        let mut config = GeneratorConfig::default();
        config.burst.min_delay_secs = 500;
        config.burst.max_delay_secs = 100;
        assert!(config.validate().is_err());
    }
}
