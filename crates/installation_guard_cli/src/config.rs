//! Input loading for the installation-guard CLI.
//!
//! Inputs come from three places, in order of precedence:
//!
//! 1. Command-line flags
//! 2. Environment variables (`INPUT_*`, the way GitHub Actions passes action
//!    inputs, and `GITHUB_API_URL`)
//! 3. An optional TOML configuration file
//!
//! Flags and environment variables are handled by clap. This module merges the
//! result with the file and hands the raw values to
//! [`Config::from_inputs`](installation_guard_core::Config::from_inputs) for
//! validation.

use std::{fs, path::Path};

use clap::Args;
use installation_guard_core::{config, parse_json_input, ConfigInputs};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::Error;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Run inputs as flags or GitHub Actions environment variables.
///
/// Token-carrying values are never echoed back in `--help`.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// JSON array of classic personal access tokens used for installation changes
    #[arg(long = "classic-pats", env = "INPUT_CLASSIC-PATS", hide_env_values = true)]
    pub classic_pats: Option<String>,

    /// JSON array of {login, installId, fineGrainedPat, skip?} objects
    #[arg(long = "owners", env = "INPUT_OWNERS", hide_env_values = true)]
    pub owners: Option<String>,

    /// Delay in milliseconds applied after every GitHub request
    #[arg(long = "sleep-between-reqs-ms", env = "INPUT_SLEEP-BETWEEN-REQS-MS")]
    pub sleep_between_reqs_ms: Option<String>,

    /// remove-sensitive (default) or sync
    #[arg(long = "mode", env = "INPUT_MODE")]
    pub mode: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long = "api-url", env = "GITHUB_API_URL")]
    pub api_url: Option<String>,
}

/// Contents of a TOML configuration file.
///
/// # Example TOML Configuration
///
/// ```toml
/// classic_pats = ["ghp_first", "ghp_second"]
/// sleep_between_reqs_ms = 250
/// mode = "sync"
///
/// [[owners]]
/// login = "acme"
/// install_id = 1234
/// fine_grained_pat = "github_pat_..."
///
/// [[owners]]
/// login = "globex"
/// install_id = 5678
/// fine_grained_pat = "github_pat_..."
/// skip = true
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub classic_pats: Option<Value>,

    #[serde(default)]
    pub owners: Option<Vec<OwnerEntry>>,

    #[serde(default)]
    pub sleep_between_reqs_ms: Option<Value>,

    #[serde(default)]
    pub mode: Option<String>,

    #[serde(default)]
    pub api_url: Option<String>,
}

/// One `[[owners]]` table.
///
/// Values stay loosely typed here so that the same validation, with the same
/// messages, applies to file and environment inputs alike. Both snake_case and
/// the camelCase names used by the JSON inputs are accepted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OwnerEntry {
    #[serde(default)]
    pub login: Option<Value>,

    #[serde(default, alias = "installId")]
    pub install_id: Option<Value>,

    #[serde(default, alias = "fineGrainedPat")]
    pub fine_grained_pat: Option<Value>,

    #[serde(default)]
    pub skip: Option<Value>,
}

impl OwnerEntry {
    /// The entry in the shape of one element of the `owners` JSON input.
    pub fn to_input(&self) -> Value {
        let mut object = Map::new();
        for (key, value) in [
            ("login", &self.login),
            ("installId", &self.install_id),
            ("fineGrainedPat", &self.fine_grained_pat),
            ("skip", &self.skip),
        ] {
            if let Some(value) = value {
                object.insert(key.to_string(), value.clone());
            }
        }
        Value::Object(object)
    }
}

impl AppConfig {
    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// - `Error::Config` if the file does not exist
    /// - `Error::LoadFile` if it cannot be read
    /// - `Error::ParseTomlFile` if it is not valid TOML or has unknown keys
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(Error::Config(format!(
                "Configuration file not found: {:?}",
                path
            )));
        }

        let content = fs::read_to_string(path).map_err(Error::LoadFile)?;
        toml::from_str(&content).map_err(Error::ParseTomlFile)
    }
}

/// Merges flag/environment inputs over the configuration file.
///
/// A blank flag or environment value counts as not provided, so the file value
/// (if any) is used instead.
///
/// # Errors
///
/// Returns an error if `--classic-pats` or `--owners` is not valid JSON.
pub fn resolve_inputs(args: &InputArgs, file: Option<AppConfig>) -> Result<ConfigInputs, Error> {
    let file = file.unwrap_or_default();

    let classic_pats = match parse_json_input(
        config::CLASSIC_PATS_INPUT,
        args.classic_pats.as_deref().unwrap_or_default(),
    )? {
        Some(value) => Some(value),
        None => file.classic_pats,
    };

    let owners = match parse_json_input(
        config::OWNERS_INPUT,
        args.owners.as_deref().unwrap_or_default(),
    )? {
        Some(value) => Some(value),
        None => file
            .owners
            .map(|entries| Value::Array(entries.iter().map(OwnerEntry::to_input).collect())),
    };

    let sleep_between_reqs_ms = match non_blank(&args.sleep_between_reqs_ms) {
        Some(text) => Some(Value::String(text)),
        None => file.sleep_between_reqs_ms,
    };

    Ok(ConfigInputs {
        classic_pats,
        owners,
        sleep_between_reqs_ms,
        mode: non_blank(&args.mode).or(file.mode),
        api_url: non_blank(&args.api_url).or(file.api_url),
    })
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
