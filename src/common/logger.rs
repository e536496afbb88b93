//! Logger setup for the hub binary and integration tests.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_level` when set, so a running
/// hub can be re-filtered without a rebuild. Calling this twice is a no-op
/// (the second `try_init` fails silently), which lets every integration
/// test call it without coordination.
pub fn setup_logger(name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{name}={default_level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
