//! SQLite-backed event store.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use falkoga_config::StorageConfig;
use falkoga_core::events::{AttackEvent, AttackType, CountryCount, Protocol};
use falkoga_core::sink::{EventWriter, WriteError};

use crate::store::{CountryField, EventStore, StoreError};

// SQLite caps bound parameters per statement; 14 columns x 500 rows stays
// comfortably inside the default limit.
const INSERT_CHUNK_ROWS: usize = 500;

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS attack_events (
    id              TEXT PRIMARY KEY,
    source_ip       TEXT    NOT NULL,
    target_ip       TEXT    NOT NULL,
    source_lat      REAL    NOT NULL,
    source_lon      REAL    NOT NULL,
    target_lat      REAL    NOT NULL,
    target_lon      REAL    NOT NULL,
    source_country  TEXT    NOT NULL,
    target_country  TEXT    NOT NULL,
    attack_type     TEXT    NOT NULL,
    severity        INTEGER NOT NULL,
    port            INTEGER NOT NULL,
    protocol        TEXT    NOT NULL,
    timestamp_ms    INTEGER NOT NULL
)";

const TIMESTAMP_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_attack_events_timestamp ON attack_events (timestamp_ms)";

const SELECT_COLUMNS: &str = "id, source_ip, target_ip, source_lat, source_lon, \
     target_lat, target_lon, source_country, target_country, attack_type, \
     severity, port, protocol, timestamp_ms";

/// Durable store over a SQLite connection pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the pool and ensures the schema exists. Bounded by the
    /// configured connect timeout so a wedged filesystem cannot stall
    /// startup.
    pub async fn connect(config: &StorageConfig) -> Result<Self, StoreError> {
        let options = SqlitePoolOptions::new().max_connections(config.max_connections);
        let connect = options.connect(&config.url);
        let pool = tokio::time::timeout(Duration::from_millis(config.connect_timeout_ms), connect)
            .await
            .map_err(|_| StoreError::ConnectTimeout(config.connect_timeout_ms))??;

        let store = Self { pool };
        store.init_schema().await?;
        info!(url = %config.url, "event store ready");
        Ok(store)
    }

    /// A private in-memory database, one connection so every query sees
    /// the same data. Used by tests and ephemeral runs.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        sqlx::query(TIMESTAMP_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    /// Idempotent batch insert: rows whose id is already stored are
    /// silently ignored.
    pub async fn insert_batch(&self, events: &[AttackEvent]) -> Result<(), StoreError> {
        if events.is_empty() {
            return Ok(());
        }

        for chunk in events.chunks(INSERT_CHUNK_ROWS) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT OR IGNORE INTO attack_events (id, source_ip, target_ip, \
                 source_lat, source_lon, target_lat, target_lon, source_country, \
                 target_country, attack_type, severity, port, protocol, timestamp_ms) ",
            );
            builder.push_values(chunk, |mut row, event| {
                row.push_bind(event.id.to_string())
                    .push_bind(&event.source_ip)
                    .push_bind(&event.target_ip)
                    .push_bind(event.source_lat)
                    .push_bind(event.source_lon)
                    .push_bind(event.target_lat)
                    .push_bind(event.target_lon)
                    .push_bind(&event.source_country)
                    .push_bind(&event.target_country)
                    .push_bind(event.attack_type.as_str())
                    .push_bind(event.severity as i64)
                    .push_bind(event.port as i64)
                    .push_bind(event.protocol.as_str())
                    .push_bind(event.timestamp_ms);
            });
            builder.build().execute(&self.pool).await?;
        }

        debug!(events = events.len(), "batch inserted");
        Ok(())
    }
}

#[async_trait]
impl EventWriter for SqliteStore {
    async fn write_batch(&self, events: &[AttackEvent]) -> Result<(), WriteError> {
        self.insert_batch(events)
            .await
            .map_err(|e| WriteError::Storage(e.to_string()))
    }
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn events_between(
        &self,
        from_ms: i64,
        to_ms: i64,
        limit: u32,
    ) -> Result<Vec<AttackEvent>, StoreError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM attack_events \
             WHERE timestamp_ms BETWEEN ?1 AND ?2 \
             ORDER BY timestamp_ms ASC LIMIT ?3"
        );
        let rows = sqlx::query(&sql)
            .bind(from_ms)
            .bind(to_ms)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_event).collect()
    }

    async fn count_since(&self, since_ms: i64) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM attack_events WHERE timestamp_ms > ?1")
            .bind(since_ms)
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count as u64)
    }

    async fn top_countries(
        &self,
        field: CountryField,
        since_ms: i64,
        limit: u32,
    ) -> Result<Vec<CountryCount>, StoreError> {
        // the column name comes from a closed enum, never from input
        let sql = format!(
            "SELECT {col} AS country, COUNT(*) AS count FROM attack_events \
             WHERE timestamp_ms > ?1 \
             GROUP BY {col} ORDER BY count DESC, country ASC LIMIT ?2",
            col = field.column()
        );
        let rows = sqlx::query(&sql)
            .bind(since_ms)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let country: String = row.try_get("country")?;
                let count: i64 = row.try_get("count")?;
                Ok(CountryCount {
                    country,
                    count: count as u64,
                })
            })
            .collect()
    }
}

fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> Result<AttackEvent, StoreError> {
    let id: String = row.try_get("id")?;
    let attack_type: String = row.try_get("attack_type")?;
    let protocol: String = row.try_get("protocol")?;
    let severity: i64 = row.try_get("severity")?;
    let port: i64 = row.try_get("port")?;

    Ok(AttackEvent {
        id: Uuid::parse_str(&id).map_err(|e| StoreError::Malformed(format!("id: {e}")))?,
        source_ip: row.try_get("source_ip")?,
        target_ip: row.try_get("target_ip")?,
        source_lat: row.try_get("source_lat")?,
        source_lon: row.try_get("source_lon")?,
        target_lat: row.try_get("target_lat")?,
        target_lon: row.try_get("target_lon")?,
        source_country: row.try_get("source_country")?,
        target_country: row.try_get("target_country")?,
        attack_type: AttackType::from_str(&attack_type)
            .map_err(|e| StoreError::Malformed(e.to_string()))?,
        severity: severity as u8,
        port: port as u16,
        protocol: Protocol::from_str(&protocol)
            .map_err(|e| StoreError::Malformed(e.to_string()))?,
        timestamp_ms: row.try_get("timestamp_ms")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(ts: i64, source: &str, target: &str) -> AttackEvent {
        AttackEvent {
            id: Uuid::new_v4(),
            source_ip: "203.0.113.5".into(),
            target_ip: "198.51.100.9".into(),
            source_lat: 1.0,
            source_lon: 2.0,
            target_lat: 3.0,
            target_lon: 4.0,
            source_country: source.into(),
            target_country: target.into(),
            attack_type: AttackType::Malware,
            severity: 6,
            port: 3306,
            protocol: Protocol::Udp,
            timestamp_ms: ts,
        }
    }

    #[tokio::test]
    async fn insert_is_idempotent_on_id() {
        let store = SqliteStore::in_memory().await.unwrap();
        let one = event(100, "CN", "US");

        store.insert_batch(&[one.clone()]).await.unwrap();
        store.insert_batch(&[one.clone()]).await.unwrap();

        assert_eq!(store.count_since(0).await.unwrap(), 1);
        let stored = store.events_between(0, 1000, 10).await.unwrap();
        assert_eq!(stored, vec![one]);
    }

    #[tokio::test]
    async fn events_between_is_ordered_and_bounded() {
        let store = SqliteStore::in_memory().await.unwrap();
        let batch = vec![
            event(300, "RU", "DE"),
            event(100, "CN", "US"),
            event(200, "BR", "JP"),
            event(900, "IN", "GB"),
        ];
        store.insert_batch(&batch).await.unwrap();

        let window = store.events_between(100, 300, 10).await.unwrap();
        let stamps: Vec<_> = window.iter().map(|e| e.timestamp_ms).collect();
        assert_eq!(stamps, vec![100, 200, 300]);

        let capped = store.events_between(0, 1000, 2).await.unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[tokio::test]
    async fn count_since_is_exclusive_of_the_boundary() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .insert_batch(&[event(100, "CN", "US"), event(200, "RU", "DE")])
            .await
            .unwrap();

        assert_eq!(store.count_since(100).await.unwrap(), 1);
        assert_eq!(store.count_since(0).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn top_countries_breaks_ties_by_code_ascending() {
        let store = SqliteStore::in_memory().await.unwrap();
        let mut batch = Vec::new();
        for _ in 0..3 {
            batch.push(event(10, "CN", "US"));
        }
        // FR and DE tie on two events each
        for _ in 0..2 {
            batch.push(event(10, "FR", "US"));
            batch.push(event(10, "DE", "US"));
        }
        store.insert_batch(&batch).await.unwrap();

        let top = store
            .top_countries(CountryField::Source, 0, 10)
            .await
            .unwrap();
        assert_eq!(
            top,
            vec![
                CountryCount { country: "CN".into(), count: 3 },
                CountryCount { country: "DE".into(), count: 2 },
                CountryCount { country: "FR".into(), count: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn top_countries_groups_by_the_requested_field() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .insert_batch(&[event(10, "CN", "US"), event(10, "RU", "US")])
            .await
            .unwrap();

        let targets = store
            .top_countries(CountryField::Target, 0, 10)
            .await
            .unwrap();
        assert_eq!(
            targets,
            vec![CountryCount { country: "US".into(), count: 2 }]
        );
    }
}
