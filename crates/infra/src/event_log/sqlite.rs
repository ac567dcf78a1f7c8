//! SQLite-backed event log.
//!
//! Events are stored in a single `events` table whose rowid doubles as the
//! global version. Optimistic concurrency is enforced twice: by the version
//! check inside the append transaction, and by the UNIQUE constraint on
//! `(aggregate_type, aggregate_id, sequence)` should two writers race past
//! the check.
//!
//! The [`EventLog`] interface is synchronous while sqlx is async, so the log
//! owns a small current-thread tokio runtime and blocks on it. Do not
//! construct one inside an async context.

use std::marker::PhantomData;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use larder_core::ExpectedVersion;
use larder_events::{Event, EventLog, EventLogError, StoredEvent};

use crate::payload::EventPayload;

const CREATE_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    global_version INTEGER PRIMARY KEY AUTOINCREMENT,
    aggregate_type TEXT NOT NULL,
    aggregate_id   TEXT NOT NULL,
    sequence       INTEGER NOT NULL,
    recorded_at    TEXT NOT NULL,
    payload        TEXT NOT NULL,
    UNIQUE (aggregate_type, aggregate_id, sequence)
)
"#;

/// SQLite-backed append-only event log.
#[derive(Debug)]
pub struct SqliteEventLog<P = EventPayload> {
    pool: SqlitePool,
    runtime: tokio::runtime::Runtime,
    _payload: PhantomData<fn() -> P>,
}

impl<P> SqliteEventLog<P> {
    /// Open (or create) a log at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EventLogError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::connect(options)
    }

    /// A throwaway log for tests; lives as long as the value.
    pub fn open_in_memory() -> Result<Self, EventLogError> {
        Self::connect(SqliteConnectOptions::new().filename(":memory:"))
    }

    fn connect(options: SqliteConnectOptions) -> Result<Self, EventLogError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| EventLogError::Storage(format!("failed to start sqlite runtime: {e}")))?;

        let pool = runtime.block_on(async {
            // A single connection keeps this a single-writer log and keeps
            // in-memory databases alive across calls.
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options)
                .await?;
            sqlx::query(CREATE_EVENTS_TABLE).execute(&pool).await?;
            Ok::<_, sqlx::Error>(pool)
        })
        .map_err(|e| storage_error("open", &e))?;

        Ok(Self {
            pool,
            runtime,
            _payload: PhantomData,
        })
    }
}

fn storage_error(operation: &str, err: &sqlx::Error) -> EventLogError {
    EventLogError::Storage(format!("sqlite {operation} failed: {err}"))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            // SQLITE_CONSTRAINT_UNIQUE / SQLITE_CONSTRAINT_PRIMARYKEY
            return code.as_ref() == "2067" || code.as_ref() == "1555";
        }
    }
    false
}

fn decode_row<P: DeserializeOwned>(row: &SqliteRow) -> Result<StoredEvent<P>, EventLogError> {
    let aggregate_type: String = row
        .try_get("aggregate_type")
        .map_err(|e| storage_error("decode", &e))?;
    let aggregate_id: String = row
        .try_get("aggregate_id")
        .map_err(|e| storage_error("decode", &e))?;
    let sequence: i64 = row
        .try_get("sequence")
        .map_err(|e| storage_error("decode", &e))?;
    let global_version: i64 = row
        .try_get("global_version")
        .map_err(|e| storage_error("decode", &e))?;
    let recorded_at: String = row
        .try_get("recorded_at")
        .map_err(|e| storage_error("decode", &e))?;
    let payload: String = row
        .try_get("payload")
        .map_err(|e| storage_error("decode", &e))?;

    let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
        .map_err(|e| EventLogError::Codec(format!("bad recorded_at timestamp: {e}")))?
        .with_timezone(&Utc);
    let payload: P = serde_json::from_str(&payload)
        .map_err(|e| EventLogError::Codec(format!("bad event payload: {e}")))?;

    Ok(StoredEvent::new(
        aggregate_type,
        aggregate_id,
        sequence as u64,
        global_version as u64,
        recorded_at,
        payload,
    ))
}

impl<P> EventLog for SqliteEventLog<P>
where
    P: Event + Serialize + DeserializeOwned,
{
    type Payload = P;

    fn append(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
        expected_version: ExpectedVersion,
        events: Vec<P>,
    ) -> Result<Vec<StoredEvent<P>>, EventLogError> {
        if events.is_empty() {
            return Ok(vec![]);
        }

        self.runtime.block_on(async {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| storage_error("begin", &e))?;

            let row = sqlx::query(
                "SELECT COALESCE(MAX(sequence), 0) AS current FROM events \
                 WHERE aggregate_type = ?1 AND aggregate_id = ?2",
            )
            .bind(aggregate_type)
            .bind(aggregate_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| storage_error("read stream version", &e))?;
            let current: i64 = row
                .try_get("current")
                .map_err(|e| storage_error("read stream version", &e))?;
            let current = current as u64;

            if !expected_version.matches(current) {
                return Err(EventLogError::Concurrency {
                    aggregate_type: aggregate_type.to_string(),
                    aggregate_id: aggregate_id.to_string(),
                    expected: expected_version,
                    actual: current,
                });
            }

            let recorded_at = Utc::now();
            let mut sequence = current;
            let mut committed = Vec::with_capacity(events.len());
            for payload in events {
                sequence += 1;
                let encoded = serde_json::to_string(&payload)
                    .map_err(|e| EventLogError::Codec(format!("bad event payload: {e}")))?;

                let result = sqlx::query(
                    "INSERT INTO events (aggregate_type, aggregate_id, sequence, recorded_at, payload) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .bind(aggregate_type)
                .bind(aggregate_id)
                .bind(sequence as i64)
                .bind(recorded_at.to_rfc3339())
                .bind(encoded)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        EventLogError::Concurrency {
                            aggregate_type: aggregate_type.to_string(),
                            aggregate_id: aggregate_id.to_string(),
                            expected: expected_version,
                            actual: current,
                        }
                    } else {
                        storage_error("insert event", &e)
                    }
                })?;

                committed.push(StoredEvent::new(
                    aggregate_type,
                    aggregate_id,
                    sequence,
                    result.last_insert_rowid() as u64,
                    recorded_at,
                    payload,
                ));
            }

            tx.commit().await.map_err(|e| storage_error("commit", &e))?;
            Ok(committed)
        })
    }

    fn read_stream(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> Result<Vec<StoredEvent<P>>, EventLogError> {
        self.runtime.block_on(async {
            let rows = sqlx::query(
                "SELECT aggregate_type, aggregate_id, sequence, global_version, recorded_at, payload \
                 FROM events WHERE aggregate_type = ?1 AND aggregate_id = ?2 ORDER BY sequence ASC",
            )
            .bind(aggregate_type)
            .bind(aggregate_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("read stream", &e))?;

            rows.iter().map(decode_row).collect()
        })
    }

    fn read_all(&self, from_global: u64, limit: usize) -> Result<Vec<StoredEvent<P>>, EventLogError> {
        self.runtime.block_on(async {
            let rows = sqlx::query(
                "SELECT aggregate_type, aggregate_id, sequence, global_version, recorded_at, payload \
                 FROM events WHERE global_version >= ?1 ORDER BY global_version ASC LIMIT ?2",
            )
            .bind(from_global.max(1) as i64)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("read all", &e))?;

            rows.iter().map(decode_row).collect()
        })
    }
}
