//! Runtime core - coordinates the generator, fan-out consumers, and
//! their lifecycles.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

use falkoga_config::FalkogaConfig;
use falkoga_core::events::AttackEvent;
use falkoga_core::hub::{BroadcastHub, SubscriberId};
use falkoga_core::sink::{BatchSink, EventWriter, NullWriter, SinkFlusher, WriteError};
use falkoga_generator::Generator;
use falkoga_relay::RelayPublisher;
use falkoga_stats::{AggregatorHandle, MemoryAggregator, StatsSnapshot, StoreAggregator};
use falkoga_storage::{SqliteStore, StoreError};
use falkoga_telemetry::MetricsRecorder;

use crate::dispatch::Dispatcher;

const HISTORY_LIMIT: u32 = 10_000;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Durable storage was unavailable at startup; history reads cannot
    /// be served in degraded mode.
    #[error("durable storage is offline")]
    StorageOffline,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Reported at the boundary so operators see degraded dependencies
/// without the stream being interrupted.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DependencyStatus {
    pub storage_online: bool,
    pub relay_online: bool,
}

enum StatsBackend {
    Store(StoreAggregator),
    Memory(MemoryAggregator),
}

/// Owns every pipeline component for one process.
pub struct Runtime {
    hub: Arc<BroadcastHub>,
    sink: Arc<BatchSink>,
    metrics: Arc<MetricsRecorder>,
    store: Option<Arc<SqliteStore>>,
    relay: Arc<RelayPublisher>,
    stats: StatsBackend,
    flusher: Mutex<Option<SinkFlusher>>,
    generator: Mutex<Option<falkoga_generator::GeneratorHandle>>,
    stats_tasks: Mutex<Option<AggregatorHandle>>,
}

impl Runtime {
    /// Connects dependencies (degrading each one independently on
    /// failure), spawns the flusher and aggregator cadences, and starts
    /// the generator. Never fails: with both externals down the live
    /// stream still runs.
    #[instrument(skip_all)]
    pub async fn start(config: FalkogaConfig) -> Arc<Self> {
        info!("initializing falkoga runtime");
        let metrics = Arc::new(MetricsRecorder::new());

        let store = if config.storage.enabled {
            match SqliteStore::connect(&config.storage).await {
                Ok(store) => Some(Arc::new(store)),
                Err(e) => {
                    warn!(error = %e, "durable storage unavailable, running degraded");
                    None
                }
            }
        } else {
            info!("durable storage disabled by configuration");
            None
        };

        let relay = Arc::new(RelayPublisher::connect(&config.relay).await);
        let hub = Arc::new(BroadcastHub::new(config.hub.subscriber_buffer));
        let sink = Arc::new(BatchSink::new());

        let writer: Arc<dyn EventWriter> = match &store {
            Some(store) => store.clone(),
            None => Arc::new(NullWriter),
        };
        let flusher = SinkFlusher::spawn(
            sink.clone(),
            Arc::new(MeteredWriter {
                inner: writer,
                metrics: metrics.clone(),
            }),
            Duration::from_secs(config.sink.flush_interval_secs),
        );

        let (stats, memory_stats, stats_tasks) = match &store {
            Some(store) => (
                StatsBackend::Store(StoreAggregator::new(store.clone(), config.stats.top_n)),
                None,
                None,
            ),
            None => {
                let aggregator = MemoryAggregator::new(config.stats.clone());
                let tasks = aggregator.start();
                (
                    StatsBackend::Memory(aggregator.clone()),
                    Some(aggregator),
                    Some(tasks),
                )
            }
        };

        let dispatcher = Dispatcher {
            hub: hub.clone(),
            sink: sink.clone(),
            relay: relay.clone(),
            memory_stats,
            metrics: metrics.clone(),
        };
        let generator = Generator::new(config.generator.clone());
        let generator_handle = generator.start(Arc::new(move |events| dispatcher.dispatch(events)));

        info!(
            storage_online = store.is_some(),
            relay_online = relay.is_connected(),
            "falkoga runtime started"
        );

        Arc::new(Self {
            hub,
            sink,
            metrics,
            store,
            relay,
            stats,
            flusher: Mutex::new(Some(flusher)),
            generator: Mutex::new(Some(generator_handle)),
            stats_tasks: Mutex::new(stats_tasks),
        })
    }

    /// Registers a live subscriber on the broadcast hub.
    pub fn subscribe(&self) -> (SubscriberId, mpsc::Receiver<Arc<str>>) {
        self.hub.subscribe()
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.hub.unsubscribe(id);
    }

    /// The current aggregate view. Storage problems degrade to the last
    /// known shape rather than erroring the read path.
    pub async fn snapshot(&self) -> StatsSnapshot {
        match &self.stats {
            StatsBackend::Store(aggregator) => match aggregator.snapshot().await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(error = %e, "stats query failed");
                    StatsSnapshot::default()
                }
            },
            StatsBackend::Memory(aggregator) => aggregator.snapshot(),
        }
    }

    /// Historical events in `[from_ms, to_ms]`, oldest first.
    pub async fn history(&self, from_ms: i64, to_ms: i64) -> Result<Vec<AttackEvent>, EngineError> {
        use falkoga_storage::EventStore;
        let store = self.store.as_ref().ok_or(EngineError::StorageOffline)?;
        Ok(store.events_between(from_ms, to_ms, HISTORY_LIMIT).await?)
    }

    pub fn status(&self) -> DependencyStatus {
        DependencyStatus {
            storage_online: self.store.is_some(),
            relay_online: self.relay.is_connected(),
        }
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// Graceful drain: stop producing, flush the remaining buffer, close
    /// subscriber streams. Safe to call more than once.
    #[instrument(skip_all)]
    pub async fn shutdown(&self) {
        info!("shutting down falkoga runtime");
        if let Some(generator) = self.generator.lock().take() {
            generator.stop();
        }
        if let Some(tasks) = self.stats_tasks.lock().take() {
            tasks.stop();
        }
        let flusher = self.flusher.lock().take();
        if let Some(flusher) = flusher {
            flusher.shutdown().await;
        }
        self.hub.close_all();
        info!("shutdown complete");
    }
}

/// Wraps the configured writer with flush metrics.
struct MeteredWriter {
    inner: Arc<dyn EventWriter>,
    metrics: Arc<MetricsRecorder>,
}

#[async_trait]
impl EventWriter for MeteredWriter {
    async fn write_batch(&self, events: &[AttackEvent]) -> Result<(), WriteError> {
        self.metrics.flush_batch_size.observe(events.len() as f64);
        self.inner.write_batch(events).await.inspect_err(|_| {
            self.metrics.flushes_failed.inc();
        })
    }
}
