use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process.
///
/// JSON lines, filtered via `RUST_LOG` (default "info"). Safe to call
/// multiple times; only the first call installs a subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_target(false)
        .try_init();
}
