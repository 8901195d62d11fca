//! Store-backed aggregation.

use std::sync::Arc;

use chrono::Utc;

use falkoga_storage::{CountryField, EventStore, StoreError};

use crate::snapshot::{per_second_rate, StatsSnapshot};

const HOUR_MS: i64 = 3600 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Aggregator answering from the durable store's windowed queries.
pub struct StoreAggregator {
    store: Arc<dyn EventStore>,
    top_n: u32,
}

impl StoreAggregator {
    pub fn new(store: Arc<dyn EventStore>, top_n: u32) -> Self {
        Self { store, top_n }
    }

    /// Rebuilds the snapshot from the store. Leaderboards cover the
    /// trailing 24 hours; ties order by country code ascending.
    pub async fn snapshot(&self) -> Result<StatsSnapshot, StoreError> {
        let now = Utc::now().timestamp_millis();
        let day_ago = now - DAY_MS;
        let hour_ago = now - HOUR_MS;

        let total_24h = self.store.count_since(day_ago).await?;
        let total_1h = self.store.count_since(hour_ago).await?;
        let top_sources = self
            .store
            .top_countries(CountryField::Source, day_ago, self.top_n)
            .await?;
        let top_targets = self
            .store
            .top_countries(CountryField::Target, day_ago, self.top_n)
            .await?;

        Ok(StatsSnapshot {
            total_24h,
            total_1h,
            per_second: per_second_rate(total_1h),
            top_sources,
            top_targets,
        })
    }
}
