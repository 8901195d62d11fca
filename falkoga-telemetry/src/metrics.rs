//! ## falkoga-telemetry::metrics
//! **Prometheus registry for the pipeline**
//!
//! ### Components:
//! - `events_generated`: total events produced by the generator
//! - `subscriber_drops`: frames skipped or lost to slow/closed subscribers
//! - `flush_batch_size`: size distribution of durable-write batches
//! - `flushes_failed`: durable writes that were dropped

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub events_generated: Counter,
    pub subscriber_drops: Counter,
    pub flush_batch_size: Histogram,
    pub flushes_failed: Counter,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();
        let events_generated =
            Counter::new("falkoga_events_generated_total", "Total generated attack events")
                .unwrap();
        let subscriber_drops = Counter::new(
            "falkoga_subscriber_drops_total",
            "Frames not delivered because a subscriber was slow or closed",
        )
        .unwrap();
        let flush_batch_size = Histogram::with_opts(
            HistogramOpts::new(
                "falkoga_flush_batch_size",
                "Events per durable-storage flush",
            )
            .buckets(vec![1.0, 8.0, 32.0, 128.0, 512.0]),
        )
        .unwrap();
        let flushes_failed = Counter::new(
            "falkoga_flushes_failed_total",
            "Durable-storage flushes that failed and were dropped",
        )
        .unwrap();

        registry.register(Box::new(events_generated.clone())).unwrap();
        registry.register(Box::new(subscriber_drops.clone())).unwrap();
        registry.register(Box::new(flush_batch_size.clone())).unwrap();
        registry.register(Box::new(flushes_failed.clone())).unwrap();

        Self {
            registry,
            events_generated,
            subscriber_drops,
            flush_batch_size,
            flushes_failed,
        }
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap())
    }
}
