//! Durable event log implementations.
//!
//! The in-memory log lives with the generic machinery in `larder-events`;
//! this module holds the storage-backed implementation.

pub mod sqlite;

pub use sqlite::SqliteEventLog;
