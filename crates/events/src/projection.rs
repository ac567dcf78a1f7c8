//! Generic incremental fold driver.

use thiserror::Error;

use crate::event::Event;
use crate::log::{EventLog, EventLogError};
use crate::stored::StoredEvent;

/// A fold over the event log.
///
/// Implementors carry their own state explicitly; the runner feeds them
/// events one at a time, in global order. A fold must be deterministic for a
/// given prefix of the log, so that rerunning from a checkpoint cannot
/// diverge.
pub trait Fold {
    type Payload: Event;
    type Error;

    /// Apply a single committed event to the fold state.
    ///
    /// Returning an error halts the run immediately; the event is
    /// redelivered on the next run (at-least-once semantics).
    fn apply(&mut self, event: &StoredEvent<Self::Payload>) -> Result<(), Self::Error>;
}

/// Projection run error.
#[derive(Debug, Error)]
pub enum ProjectionError<E> {
    #[error(transparent)]
    Log(#[from] EventLogError),

    #[error("fold failed: {0}")]
    Fold(E),
}

const DEFAULT_BATCH_SIZE: usize = 100;

/// Drives a [`Fold`] across an event log without reloading the whole log on
/// every invocation.
///
/// The runner keeps a cursor (`next_offset`, initially 0) and advances it
/// past each event only after the fold has applied it successfully. A failed
/// run can therefore be retried with the same runner and resumes at the
/// offending event. Single-threaded by design; callers wanting fresh results
/// call [`run_to_end`](ProjectionRunner::run_to_end) again before reading
/// the fold's output.
#[derive(Debug)]
pub struct ProjectionRunner<F> {
    fold: F,
    next_offset: u64,
    batch_size: usize,
}

impl<F: Fold> ProjectionRunner<F> {
    pub fn new(fold: F) -> Self {
        Self {
            fold,
            next_offset: 0,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be positive");
        self.batch_size = batch_size;
        self
    }

    /// Global version the next run will start from.
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    pub fn fold(&self) -> &F {
        &self.fold
    }

    pub fn into_fold(self) -> F {
        self.fold
    }

    /// Pull batches from the log and fold them until the log is exhausted.
    pub fn run_to_end<L>(&mut self, log: &L) -> Result<(), ProjectionError<F::Error>>
    where
        L: EventLog<Payload = F::Payload> + ?Sized,
    {
        loop {
            let batch = log.read_all(self.next_offset, self.batch_size)?;
            if batch.is_empty() {
                return Ok(());
            }
            for event in &batch {
                self.fold.apply(event).map_err(ProjectionError::Fold)?;
                self.next_offset = event.global_version() + 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryEventLog;
    use crate::test_support::TallyEvent;
    use larder_core::ExpectedVersion;

    /// Sums bump deltas; errors on a designated poison delta.
    #[derive(Debug, Default)]
    struct SumFold {
        total: i64,
        applied: usize,
        poison: Option<i64>,
    }

    impl Fold for SumFold {
        type Payload = TallyEvent;
        type Error = String;

        fn apply(&mut self, event: &StoredEvent<TallyEvent>) -> Result<(), String> {
            if let TallyEvent::Bumped { delta } = event.payload() {
                if self.poison == Some(*delta) {
                    return Err(format!("poisoned delta {delta}"));
                }
                self.total += delta;
            }
            self.applied += 1;
            Ok(())
        }
    }

    fn seed(log: &InMemoryEventLog<TallyEvent>, deltas: &[i64]) {
        let events = std::iter::once(TallyEvent::Started)
            .chain(deltas.iter().map(|d| TallyEvent::Bumped { delta: *d }))
            .collect();
        log.append("tally", "a", ExpectedVersion::Any, events).unwrap();
    }

    #[test]
    fn runs_to_the_end_across_batches() {
        let log = InMemoryEventLog::new();
        seed(&log, &[1, 2, 3, 4, 5]);

        let mut runner = ProjectionRunner::new(SumFold::default()).with_batch_size(2);
        runner.run_to_end(&log).unwrap();

        assert_eq!(runner.fold().total, 15);
        assert_eq!(runner.next_offset(), 7);
    }

    #[test]
    fn rerun_folds_only_newly_appended_events() {
        let log = InMemoryEventLog::new();
        seed(&log, &[1, 2]);

        let mut runner = ProjectionRunner::new(SumFold::default());
        runner.run_to_end(&log).unwrap();
        assert_eq!(runner.fold().applied, 3);

        log.append("tally", "a", ExpectedVersion::Any, vec![TallyEvent::Bumped { delta: 10 }])
            .unwrap();
        runner.run_to_end(&log).unwrap();

        assert_eq!(runner.fold().applied, 4);
        assert_eq!(runner.fold().total, 13);
    }

    #[test]
    fn a_fold_error_halts_the_run_and_pins_the_cursor() {
        let log = InMemoryEventLog::new();
        seed(&log, &[1, 99, 3]);

        let mut runner = ProjectionRunner::new(SumFold {
            poison: Some(99),
            ..SumFold::default()
        });
        let err = runner.run_to_end(&log).unwrap_err();
        assert!(matches!(err, ProjectionError::Fold(_)));

        // Cursor points at the offending event, so a retry redelivers it.
        assert_eq!(runner.next_offset(), 3);
        assert_eq!(runner.fold().total, 1);

        let err = runner.run_to_end(&log).unwrap_err();
        assert!(matches!(err, ProjectionError::Fold(_)));
        assert_eq!(runner.next_offset(), 3);
    }
}
