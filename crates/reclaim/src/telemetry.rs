//! Tracing bootstrap for hosts that don't install their own subscriber.

use tracing_subscriber::EnvFilter;

/// Installs a global fmt subscriber filtered by `RUST_LOG`, defaulting to
/// `info` when the variable is unset or unparseable.
///
/// Call once from the host's startup path. Hosts with their own
/// subscriber should skip this — a second install would be rejected.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
