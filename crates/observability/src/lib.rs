//! Tracing/logging setup shared by every binary that embeds the domain core.

/// Process-wide tracing initialization.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, formatting).
pub mod tracing;
