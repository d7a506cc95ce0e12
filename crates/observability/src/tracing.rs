//! Tracing/logging initialization.
//!
//! Batch runs emit one event per processed export plus per-record warnings
//! carrying the representative code, so the defaults keep targets visible
//! (to tell pipeline stages apart) and quiet everything but `panelbill`.

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset: pipeline crates at `info`,
/// dependencies at `warn`.
const DEFAULT_FILTER: &str = "warn,panelbill=info";

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // JSON lines with targets, so log pipelines can split resolver,
    // materializer, and commission events without parsing messages.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init();
}
