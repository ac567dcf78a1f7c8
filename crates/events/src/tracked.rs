//! Write-side wrapper that buffers uncommitted events.

use larder_core::Aggregate;

/// An aggregate loaded for writing.
///
/// `Tracked` pairs the replayed state with the stream version it was loaded
/// at and a buffer of uncommitted events. Mutations go through
/// [`execute`](Tracked::execute), which routes every emitted event through
/// the aggregate's own `apply`, so live mutation and replay produce
/// identical state.
#[derive(Debug, Clone)]
pub struct Tracked<A: Aggregate> {
    state: A,
    committed_version: u64,
    pending: Vec<A::Event>,
}

impl<A: Aggregate> Tracked<A> {
    /// Start a brand-new aggregate by executing its creation command against
    /// the empty state.
    pub fn create(id: A::Id, command: &A::Command) -> Result<Self, A::Error> {
        let mut tracked = Self {
            state: A::empty(id),
            committed_version: 0,
            pending: Vec::new(),
        };
        tracked.execute(command)?;
        Ok(tracked)
    }

    /// Wrap state replayed from the log at `committed_version`.
    pub fn rehydrated(state: A, committed_version: u64) -> Self {
        Self {
            state,
            committed_version,
            pending: Vec::new(),
        }
    }

    /// Decide and record. Emitted events are applied to the state and
    /// buffered until the next save.
    pub fn execute(&mut self, command: &A::Command) -> Result<(), A::Error> {
        for event in self.state.handle(command)? {
            self.state.apply(&event);
            self.pending.push(event);
        }
        Ok(())
    }

    pub fn state(&self) -> &A {
        &self.state
    }

    pub fn id(&self) -> &A::Id {
        self.state.id()
    }

    /// Stream version at the last load or save.
    pub fn committed_version(&self) -> u64 {
        self.committed_version
    }

    /// Events recorded since the last save, in order.
    pub fn pending(&self) -> &[A::Event] {
        &self.pending
    }

    /// Called by the repository after a successful append.
    pub(crate) fn commit(&mut self, committed_version: u64) {
        self.committed_version = committed_version;
        self.pending.clear();
    }

    pub fn into_state(self) -> A {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Tally, TallyCommand, TallyEvent};
    use larder_core::AggregateRoot;

    #[test]
    fn create_buffers_the_creation_event() {
        let tally = Tracked::<Tally>::create("a".to_string(), &TallyCommand::Start).unwrap();

        assert_eq!(tally.pending(), &[TallyEvent::Started]);
        assert_eq!(tally.committed_version(), 0);
        assert_eq!(tally.state().version(), 1);
    }

    #[test]
    fn execute_applies_and_buffers_in_order() {
        let mut tally = Tracked::<Tally>::create("a".to_string(), &TallyCommand::Start).unwrap();
        tally.execute(&TallyCommand::Bump { delta: 3 }).unwrap();
        tally.execute(&TallyCommand::Bump { delta: 4 }).unwrap();

        assert_eq!(tally.state().total(), 7);
        assert_eq!(tally.pending().len(), 3);
    }

    #[test]
    fn rejected_commands_leave_no_trace() {
        let mut tally = Tracked::<Tally>::create("a".to_string(), &TallyCommand::Start).unwrap();
        let before = tally.pending().len();

        assert!(tally.execute(&TallyCommand::Start).is_err());
        assert_eq!(tally.pending().len(), before);
    }
}
