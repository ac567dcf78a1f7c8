//! In-memory event log.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use larder_core::ExpectedVersion;

use crate::event::Event;
use crate::log::{EventLog, EventLogError};
use crate::stored::StoredEvent;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StreamKey {
    aggregate_type: String,
    aggregate_id: String,
}

#[derive(Debug)]
struct Inner<P> {
    /// Every committed event, in global order (`global_version` == index + 1).
    all: Vec<StoredEvent<P>>,
    /// Current version per stream.
    versions: HashMap<StreamKey, u64>,
}

/// In-memory append-only event log.
///
/// Intended for tests and development. Not optimized for large logs: stream
/// reads scan the full history.
#[derive(Debug)]
pub struct InMemoryEventLog<P> {
    inner: RwLock<Inner<P>>,
}

impl<P> InMemoryEventLog<P> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                all: Vec::new(),
                versions: HashMap::new(),
            }),
        }
    }
}

impl<P> Default for InMemoryEventLog<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Event> EventLog for InMemoryEventLog<P> {
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

        let key = StreamKey {
            aggregate_type: aggregate_type.to_string(),
            aggregate_id: aggregate_id.to_string(),
        };

        let mut inner = self
            .inner
            .write()
            .map_err(|_| EventLogError::Storage("lock poisoned".to_string()))?;

        let current = inner.versions.get(&key).copied().unwrap_or(0);
        if !expected_version.matches(current) {
            return Err(EventLogError::Concurrency {
                aggregate_type: key.aggregate_type,
                aggregate_id: key.aggregate_id,
                expected: expected_version,
                actual: current,
            });
        }

        let recorded_at = Utc::now();
        let mut sequence = current;
        let mut committed = Vec::with_capacity(events.len());
        for payload in events {
            sequence += 1;
            let global_version = inner.all.len() as u64 + 1;
            let stored = StoredEvent::new(
                aggregate_type,
                aggregate_id,
                sequence,
                global_version,
                recorded_at,
                payload,
            );
            inner.all.push(stored.clone());
            committed.push(stored);
        }
        inner.versions.insert(key, sequence);

        Ok(committed)
    }

    fn read_stream(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> Result<Vec<StoredEvent<P>>, EventLogError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| EventLogError::Storage("lock poisoned".to_string()))?;

        Ok(inner
            .all
            .iter()
            .filter(|e| e.aggregate_type() == aggregate_type && e.aggregate_id() == aggregate_id)
            .cloned()
            .collect())
    }

    fn read_all(&self, from_global: u64, limit: usize) -> Result<Vec<StoredEvent<P>>, EventLogError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| EventLogError::Storage("lock poisoned".to_string()))?;

        let start = from_global.max(1) as usize - 1;
        if start >= inner.all.len() {
            return Ok(vec![]);
        }
        let end = inner.all.len().min(start.saturating_add(limit));
        Ok(inner.all[start..end].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TallyEvent;

    fn log() -> InMemoryEventLog<TallyEvent> {
        InMemoryEventLog::new()
    }

    #[test]
    fn append_assigns_contiguous_sequences_and_globals() {
        let log = log();

        let first = log
            .append("tally", "a", ExpectedVersion::Exact(0), vec![
                TallyEvent::Started,
                TallyEvent::Bumped { delta: 2 },
            ])
            .unwrap();
        let second = log
            .append("tally", "b", ExpectedVersion::Exact(0), vec![TallyEvent::Started])
            .unwrap();

        assert_eq!(first[0].sequence(), 1);
        assert_eq!(first[1].sequence(), 2);
        assert_eq!(second[0].sequence(), 1);
        assert_eq!(first[1].global_version(), 2);
        assert_eq!(second[0].global_version(), 3);
    }

    #[test]
    fn stale_expected_version_is_rejected() {
        let log = log();
        log.append("tally", "a", ExpectedVersion::Exact(0), vec![TallyEvent::Started])
            .unwrap();

        let err = log
            .append("tally", "a", ExpectedVersion::Exact(0), vec![TallyEvent::Bumped {
                delta: 1,
            }])
            .unwrap_err();
        assert!(matches!(err, EventLogError::Concurrency { actual: 1, .. }));

        // ExpectedVersion::Any always passes.
        log.append("tally", "a", ExpectedVersion::Any, vec![TallyEvent::Bumped { delta: 1 }])
            .unwrap();
    }

    #[test]
    fn streams_with_the_same_id_but_different_types_are_distinct() {
        let log = log();
        log.append("tally", "1", ExpectedVersion::Exact(0), vec![TallyEvent::Started])
            .unwrap();
        log.append("counter", "1", ExpectedVersion::Exact(0), vec![TallyEvent::Started])
            .unwrap();

        assert_eq!(log.read_stream("tally", "1").unwrap().len(), 1);
        assert_eq!(log.read_stream("counter", "1").unwrap().len(), 1);
    }

    #[test]
    fn read_all_pages_through_the_log() {
        let log = log();
        log.append("tally", "a", ExpectedVersion::Exact(0), vec![
            TallyEvent::Started,
            TallyEvent::Bumped { delta: 1 },
            TallyEvent::Bumped { delta: 2 },
        ])
        .unwrap();

        let page = log.read_all(0, 2).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[1].global_version(), 2);

        let rest = log.read_all(3, 2).unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].global_version(), 3);

        assert!(log.read_all(4, 2).unwrap().is_empty());
    }
}
