//! # falkoga-generator
//!
//! Synthetic attack-event production on two independent schedules:
//!
//! - **Base rate**: every tick, a small uniformly-sized batch.
//! - **Bursts**: after a randomized delay, a larger total of forced-ddos
//!   events spread evenly across several sub-ticks, then rescheduled.
//!
//! Pure in-process computation; the only side effect is the callback.
//! Both schedules are cancelled together through one [`GeneratorHandle`].

use std::sync::Arc;

use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};
use tracing::debug;

use falkoga_config::GeneratorConfig;
use falkoga_core::events::{AttackEvent, AttackType};

mod synth;

pub use synth::Synthesizer;

/// Receives every generated batch. Dispatch must not block: anything slow
/// belongs on its own task.
pub type EventCallback = Arc<dyn Fn(Vec<AttackEvent>) + Send + Sync>;

/// Attack event generator.
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Starts both schedules. Each batch is handed to `callback` from the
    /// emitting schedule's own task.
    pub fn start(&self, callback: EventCallback) -> GeneratorHandle {
        let base = tokio::spawn(base_rate_loop(self.config.clone(), callback.clone()));
        let burst = tokio::spawn(burst_loop(self.config.clone(), callback));
        GeneratorHandle {
            tasks: vec![base, burst],
        }
    }
}

/// Cancels both schedules. Dropping the handle does NOT stop generation;
/// call [`GeneratorHandle::stop`].
pub struct GeneratorHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl GeneratorHandle {
    /// Cancels both schedules. Idempotent. No new callback fires after
    /// this returns; a callback already executing runs to completion.
    pub fn stop(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn base_rate_loop(config: GeneratorConfig, callback: EventCallback) {
    let synth = Synthesizer::new(&config);
    let mut ticker = interval(Duration::from_millis(config.tick_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // interval fires immediately; the first batch should wait a full tick
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let count = rand::rng().random_range(config.batch_min..=config.batch_max);
        callback(synth.batch(count as usize, None));
    }
}

async fn burst_loop(config: GeneratorConfig, callback: EventCallback) {
    let synth = Synthesizer::new(&config);
    let tick = Duration::from_millis(config.tick_interval_ms);

    loop {
        let delay_secs =
            rand::rng().random_range(config.burst.min_delay_secs..=config.burst.max_delay_secs);
        sleep(Duration::from_secs(delay_secs)).await;

        let total = rand::rng().random_range(config.burst.min_total..=config.burst.max_total);
        debug!(total, "burst episode starting");

        let per_tick = total.div_ceil(config.burst.ticks);
        let mut remaining = total;
        while remaining > 0 {
            sleep(tick).await;
            let count = per_tick.min(remaining);
            remaining -= count;
            callback(synth.batch(count as usize, Some(AttackType::Ddos)));
        }
    }
}
