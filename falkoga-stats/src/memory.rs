//! In-memory fallback aggregation for when durable storage is down.
//!
//! Totals come from a bounded buffer of recent events, so with storage
//! offline they are floors rather than exact trailing-window counts. The
//! per-second figure is a separately decayed live counter: each recorded
//! batch bumps it, and a background step multiplies it down on a fixed
//! cadence so it tracks the current rate without unbounded growth.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::trace;

use falkoga_config::StatsConfig;
use falkoga_core::events::{AttackEvent, CountryCount};

use crate::snapshot::StatsSnapshot;

const HOUR_MS: i64 = 3600 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;

struct Inner {
    recent: VecDeque<AttackEvent>,
    rate: f64,
    snapshot: StatsSnapshot,
}

/// Fallback aggregator over a bounded live window.
#[derive(Clone)]
pub struct MemoryAggregator {
    inner: Arc<Mutex<Inner>>,
    config: StatsConfig,
}

impl MemoryAggregator {
    pub fn new(config: StatsConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                recent: VecDeque::new(),
                rate: 0.0,
                snapshot: StatsSnapshot::default(),
            })),
            config,
        }
    }

    /// Ingests a batch: extends the bounded buffer and bumps the live
    /// rate counter.
    pub fn record(&self, events: &[AttackEvent]) {
        if events.is_empty() {
            return;
        }
        let mut inner = self.inner.lock();
        for event in events {
            inner.recent.push_back(event.clone());
        }
        while inner.recent.len() > self.config.memory_window {
            inner.recent.pop_front();
        }
        inner.rate += events.len() as f64;
    }

    /// The last refreshed snapshot.
    pub fn snapshot(&self) -> StatsSnapshot {
        self.inner.lock().snapshot.clone()
    }

    /// Rebuilds the snapshot from the recent buffer. Called on the
    /// refresh cadence; public so tests can drive it directly.
    pub fn refresh(&self) {
        let now = Utc::now().timestamp_millis();
        let mut inner = self.inner.lock();

        let mut total_24h = 0u64;
        let mut total_1h = 0u64;
        let mut sources: HashMap<String, u64> = HashMap::new();
        let mut targets: HashMap<String, u64> = HashMap::new();

        for event in &inner.recent {
            if event.timestamp_ms <= now - DAY_MS {
                continue;
            }
            total_24h += 1;
            if event.timestamp_ms > now - HOUR_MS {
                total_1h += 1;
            }
            *sources.entry(event.source_country.clone()).or_default() += 1;
            *targets.entry(event.target_country.clone()).or_default() += 1;
        }

        inner.snapshot = StatsSnapshot {
            total_24h,
            total_1h,
            per_second: inner.rate.round() as u64,
            top_sources: top_n(sources, self.config.top_n as usize),
            top_targets: top_n(targets, self.config.top_n as usize),
        };
        trace!(total_24h, "snapshot refreshed");
    }

    /// One decay step of the live rate counter.
    pub fn decay(&self) {
        let mut inner = self.inner.lock();
        inner.rate *= self.config.decay_factor;
    }

    /// Spawns the refresh and decay cadence tasks.
    pub fn start(&self) -> AggregatorHandle {
        let refresh_task = tokio::spawn({
            let aggregator = self.clone();
            let period = Duration::from_secs(aggregator.config.refresh_interval_secs);
            async move {
                let mut ticker = tokio::time::interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    aggregator.refresh();
                }
            }
        });
        let decay_task = tokio::spawn({
            let aggregator = self.clone();
            let period = Duration::from_millis(aggregator.config.decay_interval_ms);
            async move {
                let mut ticker = tokio::time::interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    aggregator.decay();
                }
            }
        });
        AggregatorHandle {
            tasks: vec![refresh_task, decay_task],
        }
    }
}

/// Cancels the cadence tasks.
pub struct AggregatorHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl AggregatorHandle {
    pub fn stop(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Count descending, ties by country code ascending.
fn top_n(counts: HashMap<String, u64>, limit: usize) -> Vec<CountryCount> {
    let mut ranked: Vec<CountryCount> = counts
        .into_iter()
        .map(|(country, count)| CountryCount { country, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.country.cmp(&b.country)));
    ranked.truncate(limit);
    ranked
}
