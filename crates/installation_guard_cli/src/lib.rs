//! installation-guard CLI library.
//!
//! The binary is a thin wrapper around [`execute`]; everything else lives here
//! so it can be tested without spawning a process.

use std::path::Path;

use installation_guard_core::{build_owner_contexts, run, Config, RotatingClientFactory, RunResult};
use tracing::info;

pub mod config;
pub mod errors;
pub mod logging;

use config::{resolve_inputs, AppConfig, InputArgs};
use errors::Error;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Runs one reconciliation pass over every configured owner.
///
/// The returned [`RunResult`] has already been logged as a summary.
///
/// # Errors
///
/// - Configuration problems (file, JSON, validation) and client construction
///   failures, before any owner is processed
/// - `Error::RunFailed` once every owner has been processed, if any failed
pub async fn execute(args: &InputArgs, config_path: Option<&Path>) -> Result<RunResult, Error> {
    let file = config_path.map(AppConfig::load).transpose()?;
    let config = Config::from_inputs(resolve_inputs(args, file)?)?;

    info!(
        owners = config.owners.len(),
        classic_tokens = config.classic_pats.len(),
        mode = %config.mode,
        pacing_ms = config.pacing.as_millis() as u64,
        "Configuration loaded"
    );

    let factory = RotatingClientFactory::new(&config);
    let contexts = build_owner_contexts(&config, &factory)?;

    let result = run(&contexts, config.mode).await;
    result.log_summary();

    if result.has_failure() {
        return Err(Error::RunFailed);
    }
    Ok(result)
}
