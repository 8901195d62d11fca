//! Batch sink: in-memory buffer drained on a fixed interval into one
//! durable write per flush.
//!
//! Durability is best-effort by design. A failed write is logged and the
//! batch dropped; the pipeline favors not stalling ingestion over
//! guaranteeing every event lands.

use std::mem;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::events::AttackEvent;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("durable write failed: {0}")]
    Storage(String),
}

/// Destination of a flushed batch. Implementations must dedupe on event id
/// so the at-least-once upstream can re-deliver safely.
#[async_trait]
pub trait EventWriter: Send + Sync {
    async fn write_batch(&self, events: &[AttackEvent]) -> Result<(), WriteError>;
}

/// Degraded-mode writer: accepts and discards every batch.
pub struct NullWriter;

#[async_trait]
impl EventWriter for NullWriter {
    async fn write_batch(&self, _events: &[AttackEvent]) -> Result<(), WriteError> {
        Ok(())
    }
}

/// Pending-event buffer shared between the ingestion path and the flusher.
#[derive(Default)]
pub struct BatchSink {
    pending: Mutex<Vec<AttackEvent>>,
}

impl BatchSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous, non-blocking append. Safe under concurrent callers.
    pub fn enqueue(&self, events: &[AttackEvent]) {
        if events.is_empty() {
            return;
        }
        self.pending.lock().extend_from_slice(events);
    }

    /// Atomically swaps out the entire buffer. Enqueues racing with a
    /// drain land in the fresh buffer: nothing is lost, nothing is
    /// flushed twice, and readers never observe a partial batch.
    pub fn drain(&self) -> Vec<AttackEvent> {
        mem::take(&mut *self.pending.lock())
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }
}

/// Background task flushing a [`BatchSink`] into an [`EventWriter`] on a
/// fixed interval.
pub struct SinkFlusher {
    task: JoinHandle<()>,
    sink: Arc<BatchSink>,
    writer: Arc<dyn EventWriter>,
}

impl SinkFlusher {
    pub fn spawn(
        sink: Arc<BatchSink>,
        writer: Arc<dyn EventWriter>,
        interval: Duration,
    ) -> Self {
        let task = tokio::spawn({
            let sink = sink.clone();
            let writer = writer.clone();
            async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    flush_once(&sink, writer.as_ref()).await;
                }
            }
        });
        Self { task, sink, writer }
    }

    /// Graceful drain: stops the periodic task, then flushes whatever is
    /// still buffered.
    pub async fn shutdown(self) {
        self.task.abort();
        flush_once(&self.sink, self.writer.as_ref()).await;
    }
}

async fn flush_once(sink: &BatchSink, writer: &dyn EventWriter) {
    let batch = sink.drain();
    if batch.is_empty() {
        return;
    }
    match writer.write_batch(&batch).await {
        Ok(()) => debug!(events = batch.len(), "flushed batch"),
        Err(e) => warn!(events = batch.len(), error = %e, "flush failed, dropping batch"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AttackType, Protocol};
    use std::collections::HashSet;
    use uuid::Uuid;

    fn event() -> AttackEvent {
        AttackEvent {
            id: Uuid::new_v4(),
            source_ip: "198.51.100.1".into(),
            target_ip: "198.51.100.2".into(),
            source_lat: 0.0,
            source_lon: 0.0,
            target_lat: 0.0,
            target_lon: 0.0,
            source_country: "BR".into(),
            target_country: "JP".into(),
            attack_type: AttackType::Scanning,
            severity: 1,
            port: 53,
            protocol: Protocol::Icmp,
            timestamp_ms: 7,
        }
    }

    struct RecordingWriter {
        batches: Mutex<Vec<Vec<AttackEvent>>>,
    }

    #[async_trait]
    impl EventWriter for RecordingWriter {
        async fn write_batch(&self, events: &[AttackEvent]) -> Result<(), WriteError> {
            self.batches.lock().push(events.to_vec());
            Ok(())
        }
    }

    struct FailingWriter;

    #[async_trait]
    impl EventWriter for FailingWriter {
        async fn write_batch(&self, _events: &[AttackEvent]) -> Result<(), WriteError> {
            Err(WriteError::Storage("disk on fire".into()))
        }
    }

    #[test]
    fn drain_empties_the_buffer() {
        let sink = BatchSink::new();
        sink.enqueue(&[event(), event()]);
        assert_eq!(sink.pending_len(), 2);
        assert_eq!(sink.drain().len(), 2);
        assert_eq!(sink.pending_len(), 0);
        assert!(sink.drain().is_empty());
    }

    /// Every enqueued event lands in exactly one drained batch, even with
    /// enqueues and drains interleaving from multiple threads.
    #[test]
    fn interleaved_enqueue_and_drain_loses_nothing() {
        let sink = Arc::new(BatchSink::new());
        let mut expected = HashSet::new();
        let mut producers = Vec::new();

        for _ in 0..4 {
            let events: Vec<AttackEvent> = (0..250).map(|_| event()).collect();
            expected.extend(events.iter().map(|e| e.id));
            let sink = sink.clone();
            producers.push(std::thread::spawn(move || {
                for chunk in events.chunks(10) {
                    sink.enqueue(chunk);
                }
            }));
        }

        let drainer = {
            let sink = sink.clone();
            std::thread::spawn(move || {
                let mut seen = Vec::new();
                for _ in 0..100 {
                    seen.extend(sink.drain());
                    std::thread::yield_now();
                }
                seen
            })
        };

        for producer in producers {
            producer.join().unwrap();
        }
        let mut seen = drainer.join().unwrap();
        seen.extend(sink.drain());

        let ids: HashSet<_> = seen.iter().map(|e| e.id).collect();
        assert_eq!(seen.len(), ids.len(), "an event was drained twice");
        assert_eq!(ids, expected, "an event was dropped");
    }

    #[tokio::test(start_paused = true)]
    async fn flusher_writes_one_batch_per_interval() {
        let sink = Arc::new(BatchSink::new());
        let writer = Arc::new(RecordingWriter {
            batches: Mutex::new(Vec::new()),
        });
        let flusher = SinkFlusher::spawn(sink.clone(), writer.clone(), Duration::from_secs(5));

        sink.enqueue(&[event(), event(), event()]);
        tokio::time::sleep(Duration::from_secs(6)).await;

        {
            let batches = writer.batches.lock();
            assert_eq!(batches.len(), 1);
            assert_eq!(batches[0].len(), 3);
        }
        assert_eq!(sink.pending_len(), 0);

        flusher.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_flush_drops_the_batch_without_retry() {
        let sink = Arc::new(BatchSink::new());
        let flusher =
            SinkFlusher::spawn(sink.clone(), Arc::new(FailingWriter), Duration::from_secs(5));

        sink.enqueue(&[event()]);
        tokio::time::sleep(Duration::from_secs(6)).await;
        // dropped, not re-buffered
        assert_eq!(sink.pending_len(), 0);

        flusher.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_flushes_the_remaining_buffer() {
        let sink = Arc::new(BatchSink::new());
        let writer = Arc::new(RecordingWriter {
            batches: Mutex::new(Vec::new()),
        });
        let flusher = SinkFlusher::spawn(sink.clone(), writer.clone(), Duration::from_secs(60));

        sink.enqueue(&[event(), event()]);
        flusher.shutdown().await;

        let batches = writer.batches.lock();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
    }
}
