//! `larder-events` — domain-agnostic event-sourcing machinery.
//!
//! Everything here is generic over the event payload type: the append-only
//! [`EventLog`] interface, the [`Repository`] that replays streams into
//! aggregate state, the [`Tracked`] write-side wrapper that buffers
//! uncommitted events, and the [`ProjectionRunner`] that drives folds across
//! the whole log. Domain crates supply the payloads; infrastructure supplies
//! durable log implementations.

pub mod event;
pub mod log;
pub mod memory;
pub mod projection;
pub mod repository;
pub mod stored;
pub mod tracked;

pub use event::Event;
pub use log::{EventLog, EventLogError};
pub use memory::InMemoryEventLog;
pub use projection::{Fold, ProjectionError, ProjectionRunner};
pub use repository::{Repository, RepositoryError};
pub use stored::StoredEvent;
pub use tracked::Tracked;

#[cfg(test)]
pub(crate) mod test_support;
