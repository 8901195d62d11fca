//! The durable store contract.

use async_trait::async_trait;
use thiserror::Error;

use falkoga_core::events::{AttackEvent, CountryCount};
use falkoga_core::sink::EventWriter;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("database connect timed out after {0} ms")]
    ConnectTimeout(u64),

    #[error("malformed stored row: {0}")]
    Malformed(String),
}

/// Which directional country column a leaderboard query groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountryField {
    Source,
    Target,
}

impl CountryField {
    pub(crate) fn column(self) -> &'static str {
        match self {
            CountryField::Source => "source_country",
            CountryField::Target => "target_country",
        }
    }
}

/// Durable event storage: an idempotent writer plus windowed reads.
///
/// `write_batch` (via [`EventWriter`]) must treat an already-stored event
/// id as a no-op so the at-least-once sink can re-deliver safely.
#[async_trait]
pub trait EventStore: EventWriter {
    /// Events with `from_ms <= timestamp <= to_ms`, ascending, capped at
    /// `limit` rows.
    async fn events_between(
        &self,
        from_ms: i64,
        to_ms: i64,
        limit: u32,
    ) -> Result<Vec<AttackEvent>, StoreError>;

    /// Count of events with `timestamp > since_ms`.
    async fn count_since(&self, since_ms: i64) -> Result<u64, StoreError>;

    /// Top `limit` countries by event count since `since_ms`, ordered by
    /// count descending, ties broken by country code ascending.
    async fn top_countries(
        &self,
        field: CountryField,
        since_ms: i64,
        limit: u32,
    ) -> Result<Vec<CountryCount>, StoreError>;
}
