//! Tracing subscriber setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;

/// Environment variable holding an explicit log filter, e.g. `debug` or
/// `installation_guard_core=debug,github_client=trace`.
pub const LOG_ENV: &str = "INSTALLATION_GUARD_LOG";

/// Set to `1` by GitHub Actions when a run is re-run with debug logging.
pub const RUNNER_DEBUG_ENV: &str = "RUNNER_DEBUG";

/// Filter used when [`LOG_ENV`] is not set.
pub fn default_directive(runner_debug: Option<&str>) -> &'static str {
    match runner_debug.map(str::trim) {
        Some("1") => "debug",
        _ => "info",
    }
}

/// Builds the filter from [`LOG_ENV`], falling back to [`default_directive`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let runner_debug = std::env::var(RUNNER_DEBUG_ENV).ok();
        EnvFilter::new(default_directive(runner_debug.as_deref()))
    })
}

/// Installs the global subscriber. Call once, at startup.
pub fn init() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(env_filter())
        .init();
}
