//! The point-in-time aggregate view.

use serde::{Deserialize, Serialize};

use falkoga_core::events::CountryCount;

/// Aggregate view of recent activity. Rebuilt on each refresh cycle,
/// never updated incrementally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    #[serde(rename = "total24h")]
    pub total_24h: u64,
    #[serde(rename = "total1h")]
    pub total_1h: u64,
    pub per_second: u64,
    pub top_sources: Vec<CountryCount>,
    pub top_targets: Vec<CountryCount>,
}

/// Smoothed trailing rate: events in the last hour divided across the
/// hour, rounded to the nearest integer.
pub fn per_second_rate(total_1h: u64) -> u64 {
    (total_1h as f64 / 3600.0).round() as u64
}
