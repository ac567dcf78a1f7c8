//! The event contract.

/// A domain event payload.
///
/// Events are immutable facts. Treat them as append-only: once persisted,
/// neither their meaning nor their `event_type` name may change.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "meal.ingredient-added").
    fn event_type(&self) -> &'static str;
}
