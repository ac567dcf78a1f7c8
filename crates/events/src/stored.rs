//! Committed events as they sit in the log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An event that has been committed to the log, with stream metadata.
///
/// Notes:
/// - `sequence` is the position within one aggregate stream (from 1).
/// - `global_version` is the position within the whole log (from 1); folds
///   consume events in this order.
/// - `recorded_at` is assigned by the log at append time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent<P> {
    aggregate_type: String,
    aggregate_id: String,
    sequence: u64,
    global_version: u64,
    recorded_at: DateTime<Utc>,
    payload: P,
}

impl<P> StoredEvent<P> {
    pub fn new(
        aggregate_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        sequence: u64,
        global_version: u64,
        recorded_at: DateTime<Utc>,
        payload: P,
    ) -> Self {
        Self {
            aggregate_type: aggregate_type.into(),
            aggregate_id: aggregate_id.into(),
            sequence,
            global_version,
            recorded_at,
            payload,
        }
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    /// Position within the aggregate stream (per-aggregate version).
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Position within the whole log (total order).
    pub fn global_version(&self) -> u64 {
        self.global_version
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn into_payload(self) -> P {
        self.payload
    }
}
