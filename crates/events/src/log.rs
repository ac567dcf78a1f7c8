//! Append-only event log interface.

use std::sync::Arc;

use larder_core::ExpectedVersion;
use thiserror::Error;

use crate::event::Event;
use crate::stored::StoredEvent;

/// Event log operation error.
#[derive(Debug, Error)]
pub enum EventLogError {
    /// Another writer advanced the stream since it was read.
    #[error(
        "optimistic concurrency check failed for {aggregate_type}/{aggregate_id}: \
         expected {expected:?}, found {actual}"
    )]
    Concurrency {
        aggregate_type: String,
        aggregate_id: String,
        expected: ExpectedVersion,
        actual: u64,
    },

    /// The backing storage failed.
    #[error("event log storage failure: {0}")]
    Storage(String),

    /// A persisted event could not be encoded or decoded.
    #[error("event codec failure: {0}")]
    Codec(String),
}

/// An append-only, globally ordered event log.
///
/// Streams are keyed by `(aggregate_type, aggregate_id)`. Within a stream the
/// log assigns contiguous sequence numbers starting at 1; across the log it
/// assigns a strictly increasing `global_version`, which is the total order
/// that projections consume.
///
/// Implementations must:
/// - enforce optimistic concurrency against the current stream version
/// - assign sequence numbers and global versions atomically per append
/// - allow reads to proceed while appends happen (a reader may simply
///   observe a shorter prefix)
pub trait EventLog: Send + Sync {
    type Payload: Event;

    /// Append events to one stream, with an optimistic-concurrency check.
    fn append(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
        expected_version: ExpectedVersion,
        events: Vec<Self::Payload>,
    ) -> Result<Vec<StoredEvent<Self::Payload>>, EventLogError>;

    /// All events for one stream, ordered by sequence number.
    fn read_stream(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> Result<Vec<StoredEvent<Self::Payload>>, EventLogError>;

    /// Up to `limit` events with `global_version >= from_global`, in global
    /// order. An empty result means the caller has reached the end.
    fn read_all(
        &self,
        from_global: u64,
        limit: usize,
    ) -> Result<Vec<StoredEvent<Self::Payload>>, EventLogError>;
}

impl<L> EventLog for Arc<L>
where
    L: EventLog + ?Sized,
{
    type Payload = L::Payload;

    fn append(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
        expected_version: ExpectedVersion,
        events: Vec<Self::Payload>,
    ) -> Result<Vec<StoredEvent<Self::Payload>>, EventLogError> {
        (**self).append(aggregate_type, aggregate_id, expected_version, events)
    }

    fn read_stream(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> Result<Vec<StoredEvent<Self::Payload>>, EventLogError> {
        (**self).read_stream(aggregate_type, aggregate_id)
    }

    fn read_all(
        &self,
        from_global: u64,
        limit: usize,
    ) -> Result<Vec<StoredEvent<Self::Payload>>, EventLogError> {
        (**self).read_all(from_global, limit)
    }
}
