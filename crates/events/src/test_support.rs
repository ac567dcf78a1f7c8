//! Minimal aggregate used by the unit tests in this crate.

use larder_core::{Aggregate, AggregateRoot, DomainError};

use crate::event::Event;

/// A running total. Just enough behaviour to exercise the machinery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tally {
    id: String,
    total: i64,
    version: u64,
    created: bool,
}

impl Tally {
    pub(crate) fn total(&self) -> i64 {
        self.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TallyCommand {
    Start,
    Bump { delta: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TallyEvent {
    Started,
    Bumped { delta: i64 },
}

impl Event for TallyEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TallyEvent::Started => "tally.started",
            TallyEvent::Bumped { .. } => "tally.bumped",
        }
    }
}

impl AggregateRoot for Tally {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Tally {
    type Command = TallyCommand;
    type Event = TallyEvent;
    type Error = DomainError;

    const AGGREGATE_TYPE: &'static str = "tally";

    fn empty(id: Self::Id) -> Self {
        Self {
            id,
            total: 0,
            version: 0,
            created: false,
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            TallyEvent::Started => {
                self.created = true;
            }
            TallyEvent::Bumped { delta } => {
                self.total += delta;
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            TallyCommand::Start => {
                if self.created {
                    return Err(DomainError::conflict("tally already started"));
                }
                Ok(vec![TallyEvent::Started])
            }
            TallyCommand::Bump { delta } => {
                if !self.created {
                    return Err(DomainError::not_found());
                }
                Ok(vec![TallyEvent::Bumped { delta: *delta }])
            }
        }
    }
}
