//! Per-batch fan-out from the generator callback.
//!
//! Everything on this path must return promptly: hub delivery and sink
//! enqueue are non-blocking, and the relay gets its own detached task per
//! batch so a slow external round-trip never backs up into generation.

use std::sync::Arc;

use falkoga_core::events::AttackEvent;
use falkoga_core::hub::BroadcastHub;
use falkoga_core::sink::BatchSink;
use falkoga_relay::RelayPublisher;
use falkoga_stats::MemoryAggregator;
use falkoga_telemetry::MetricsRecorder;

pub(crate) struct Dispatcher {
    pub hub: Arc<BroadcastHub>,
    pub sink: Arc<BatchSink>,
    pub relay: Arc<RelayPublisher>,
    /// Present only when running without durable storage.
    pub memory_stats: Option<MemoryAggregator>,
    pub metrics: Arc<MetricsRecorder>,
}

impl Dispatcher {
    /// Fans one generated batch out to every consumer. Within the batch,
    /// the hub, sink, and relay all observe the same relative order.
    pub fn dispatch(&self, events: Vec<AttackEvent>) {
        if events.is_empty() {
            return;
        }
        self.metrics.events_generated.inc_by(events.len() as f64);

        let outcome = self.hub.publish(&events);
        let drops = outcome.skipped + outcome.removed;
        if drops > 0 {
            self.metrics.subscriber_drops.inc_by(drops as f64);
        }

        self.sink.enqueue(&events);

        if let Some(stats) = &self.memory_stats {
            stats.record(&events);
        }

        // one publish per event, sequenced on a detached task so batch
        // order survives without blocking this callback
        if self.relay.is_connected() {
            let relay = self.relay.clone();
            tokio::spawn(async move {
                for event in &events {
                    relay.publish(event).await;
                }
            });
        }
    }
}
