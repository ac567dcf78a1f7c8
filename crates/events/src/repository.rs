//! Generic load/save over an event log.

use core::fmt;
use std::marker::PhantomData;

use larder_core::{Aggregate, ExpectedVersion};
use thiserror::Error;

use crate::log::{EventLog, EventLogError};
use crate::tracked::Tracked;

/// Repository operation error.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No creation event exists for the requested aggregate.
    #[error("{aggregate_type} {id} not found")]
    NotFound {
        aggregate_type: &'static str,
        id: String,
    },

    /// Another writer advanced the stream since it was loaded. Recoverable by
    /// reloading and retrying at the caller's discretion; never retried here.
    #[error("{aggregate_type} {id} was modified concurrently")]
    Conflict {
        aggregate_type: &'static str,
        id: String,
        #[source]
        source: EventLogError,
    },

    #[error(transparent)]
    Log(#[from] EventLogError),
}

/// Generic aggregate repository bound to one event log.
///
/// `load` replays the aggregate's full stream onto its empty state; `save`
/// appends the buffered events with the loaded version as the
/// optimistic-concurrency precondition.
pub struct Repository<A, L> {
    log: L,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A, L> Repository<A, L>
where
    A: Aggregate,
    A::Id: fmt::Display + Clone,
    L: EventLog,
    L::Payload: From<A::Event>,
    A::Event: TryFrom<L::Payload>,
{
    pub fn new(log: L) -> Self {
        Self {
            log,
            _aggregate: PhantomData,
        }
    }

    /// Replay the stream for `id` into its current state.
    ///
    /// Payloads that do not convert to this aggregate's event type replay as
    /// no-ops, so streams written by newer software remain readable.
    pub fn load(&self, id: &A::Id) -> Result<Tracked<A>, RepositoryError> {
        let stream = self.log.read_stream(A::AGGREGATE_TYPE, &id.to_string())?;
        if stream.is_empty() {
            return Err(RepositoryError::NotFound {
                aggregate_type: A::AGGREGATE_TYPE,
                id: id.to_string(),
            });
        }

        let mut state = A::empty(id.clone());
        let mut version = 0;
        for stored in stream {
            version = stored.sequence();
            match A::Event::try_from(stored.into_payload()) {
                Ok(event) => state.apply(&event),
                Err(_) => {
                    tracing::warn!(
                        aggregate_type = A::AGGREGATE_TYPE,
                        sequence = version,
                        "skipping unrecognised event during replay"
                    );
                }
            }
        }

        Ok(Tracked::rehydrated(state, version))
    }

    /// Append the aggregate's pending events, then clear its buffer.
    pub fn save(&self, aggregate: &mut Tracked<A>) -> Result<(), RepositoryError> {
        if aggregate.pending().is_empty() {
            return Ok(());
        }

        let expected = ExpectedVersion::Exact(aggregate.committed_version());
        let payloads: Vec<L::Payload> = aggregate.pending().iter().cloned().map(Into::into).collect();

        let committed = self
            .log
            .append(
                A::AGGREGATE_TYPE,
                &aggregate.id().to_string(),
                expected,
                payloads,
            )
            .map_err(|source| match source {
                EventLogError::Concurrency { .. } => RepositoryError::Conflict {
                    aggregate_type: A::AGGREGATE_TYPE,
                    id: aggregate.id().to_string(),
                    source,
                },
                other => RepositoryError::Log(other),
            })?;

        // Committed batches are never empty here: pending was non-empty.
        let version = committed
            .last()
            .map(|e| e.sequence())
            .unwrap_or_else(|| aggregate.committed_version());
        aggregate.commit(version);
        Ok(())
    }
}
