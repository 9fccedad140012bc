//! Run configuration and its validation.
//!
//! Inputs arrive as loosely typed JSON values, from GitHub Actions inputs,
//! command-line flags or a TOML file. [`Config::from_inputs`] is the single
//! validation pass that turns them into a typed, immutable [`Config`]. It either
//! succeeds completely or reports every problem it found, so a run never starts
//! with a partially understood configuration.
//!
//! Accepted shapes:
//!
//! - `classic-pats`: array of non-empty token strings (at least one).
//! - `owners`: array of `{login, installId, fineGrainedPat, skip?}` objects.
//!   `installId` is a non-negative integer or a string of digits; `skip` is a
//!   boolean or the string `"true"`/`"false"` in any case.
//! - `sleep-between-reqs-ms`: non-negative integer or string of digits.
//! - `mode`: `remove-sensitive` or `sync`.
//! - `api-url`: absolute `http`/`https` URL.
//!
//! Empty strings count as "not provided", which is how GitHub Actions passes
//! unset inputs.

use std::{fmt, str::FromStr, time::Duration};

use github_client::ClientOptions;
use secrecy::SecretString;
use serde_json::Value;

use crate::errors::{ConfigError, ValidationErrors};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

pub const CLASSIC_PATS_INPUT: &str = "classic-pats";
pub const OWNERS_INPUT: &str = "owners";
pub const SLEEP_INPUT: &str = "sleep-between-reqs-ms";
pub const MODE_INPUT: &str = "mode";
pub const API_URL_INPUT: &str = "api-url";

/// Which installation adjustments a run makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Only remove sensitive repositories from the installation.
    #[default]
    RemoveSensitive,
    /// Add non-sensitive repositories and remove sensitive ones.
    Sync,
}

impl SyncMode {
    /// Whether non-sensitive repositories are added to the installation.
    pub fn adds_repositories(self) -> bool {
        matches!(self, Self::Sync)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RemoveSensitive => "remove-sensitive",
            Self::Sync => "sync",
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remove-sensitive" => Ok(Self::RemoveSensitive),
            "sync" => Ok(Self::Sync),
            other => Err(format!(
                "expected 'remove-sensitive' or 'sync', got '{}'",
                other
            )),
        }
    }
}

/// One organization managed by a run.
#[derive(Debug)]
pub struct Owner {
    /// Organization login.
    pub login: String,
    /// ID of the GitHub App installation on this organization.
    pub install_id: u64,
    /// Fine-grained token able to read the organization's custom property values.
    pub fine_grained_pat: SecretString,
    /// When set, the owner is reported as skipped and nothing is requested for it.
    pub skip: bool,
}

/// Raw, untyped inputs before validation.
///
/// `None` and empty strings both mean "not provided".
#[derive(Debug, Clone, Default)]
pub struct ConfigInputs {
    pub classic_pats: Option<Value>,
    pub owners: Option<Value>,
    pub sleep_between_reqs_ms: Option<Value>,
    pub mode: Option<String>,
    pub api_url: Option<String>,
}

/// Validated configuration of a run.
#[derive(Debug)]
pub struct Config {
    /// Owners in the order they are processed.
    pub owners: Vec<Owner>,
    /// Shared pool of classic tokens used for installation changes.
    pub classic_pats: Vec<SecretString>,
    /// Delay applied after every GitHub request.
    pub pacing: Duration,
    pub mode: SyncMode,
    /// Base URL of the GitHub REST API, when not `https://api.github.com`.
    pub api_url: Option<String>,
}

impl Config {
    /// Validates raw inputs into a configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` listing every issue found.
    pub fn from_inputs(inputs: ConfigInputs) -> Result<Self, ConfigError> {
        let mut errors = ValidationErrors::default();

        let classic_pats = validate_tokens(inputs.classic_pats.as_ref(), &mut errors);
        let owners = validate_owners(inputs.owners.as_ref(), &mut errors);
        let pacing = validate_sleep(inputs.sleep_between_reqs_ms.as_ref(), &mut errors);
        let mode = match non_blank(inputs.mode.as_deref()) {
            None => SyncMode::default(),
            Some(text) => text.parse().unwrap_or_else(|message: String| {
                errors.push(MODE_INPUT, message);
                SyncMode::default()
            }),
        };
        let api_url = validate_api_url(inputs.api_url.as_deref(), &mut errors);

        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }

        Ok(Self {
            owners,
            classic_pats,
            pacing,
            mode,
            api_url,
        })
    }

    /// Options for every GitHub client built for this run.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_uri: self.api_url.clone(),
            pacing: self.pacing,
        }
    }
}

/// Parses an input that carries JSON text.
///
/// Blank text means the input was not provided and yields `Ok(None)`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidJson` naming the input when the text is not JSON.
pub fn parse_json_input(input: &str, text: &str) -> Result<Option<Value>, ConfigError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(|source| ConfigError::InvalidJson {
            input: input.to_string(),
            source,
        })
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn validate_tokens(value: Option<&Value>, errors: &mut ValidationErrors) -> Vec<SecretString> {
    if is_absent(value) {
        errors.push(CLASSIC_PATS_INPUT, "is required");
        return Vec::new();
    }
    let Some(Value::Array(items)) = value else {
        errors.push(CLASSIC_PATS_INPUT, "must be an array of token strings");
        return Vec::new();
    };
    if items.is_empty() {
        errors.push(CLASSIC_PATS_INPUT, "must contain at least one token");
        return Vec::new();
    }

    let mut tokens = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item.as_str().map(str::trim) {
            Some(token) if !token.is_empty() => tokens.push(SecretString::from(token.to_string())),
            _ => errors.push(
                format!("{}[{}]", CLASSIC_PATS_INPUT, i),
                "must be a non-empty string",
            ),
        }
    }
    tokens
}

fn validate_owners(value: Option<&Value>, errors: &mut ValidationErrors) -> Vec<Owner> {
    if is_absent(value) {
        errors.push(OWNERS_INPUT, "is required");
        return Vec::new();
    }
    let Some(Value::Array(items)) = value else {
        errors.push(OWNERS_INPUT, "must be an array of owner objects");
        return Vec::new();
    };

    let mut owners: Vec<Owner> = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let path = format!("{}[{}]", OWNERS_INPUT, i);
        let Some(fields) = item.as_object() else {
            errors.push(path, "must be an object");
            continue;
        };

        let login = required_string(fields.get("login"), &format!("{}.login", path), errors);
        let install_id = install_id(fields.get("installId"), &format!("{}.installId", path), errors);
        let fine_grained_pat = required_string(
            fields.get("fineGrainedPat"),
            &format!("{}.fineGrainedPat", path),
            errors,
        );
        let skip = skip_flag(fields.get("skip"), &format!("{}.skip", path), errors);

        if let Some(login) = &login {
            if owners.iter().any(|o| o.login.eq_ignore_ascii_case(login)) {
                errors.push(
                    format!("{}.login", path),
                    format!("duplicate owner '{}'", login),
                );
                continue;
            }
        }

        if let (Some(login), Some(install_id), Some(pat), Some(skip)) =
            (login, install_id, fine_grained_pat, skip)
        {
            owners.push(Owner {
                login,
                install_id,
                fine_grained_pat: SecretString::from(pat),
                skip,
            });
        }
    }
    owners
}

fn required_string(
    value: Option<&Value>,
    path: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match value.and_then(Value::as_str).map(str::trim) {
        Some(text) if !text.is_empty() => Some(text.to_string()),
        _ => {
            errors.push(path, "must be a non-empty string");
            None
        }
    }
}

fn install_id(value: Option<&Value>, path: &str, errors: &mut ValidationErrors) -> Option<u64> {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    if parsed.is_none() {
        errors.push(path, "must be a non-negative integer");
    }
    parsed
}

fn skip_flag(value: Option<&Value>, path: &str, errors: &mut ValidationErrors) -> Option<bool> {
    match value {
        None | Some(Value::Null) => Some(false),
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "" | "false" => Some(false),
            "true" => Some(true),
            _ => {
                errors.push(path, "must be true or false");
                None
            }
        },
        Some(_) => {
            errors.push(path, "must be true or false");
            None
        }
    }
}

fn validate_sleep(value: Option<&Value>, errors: &mut ValidationErrors) -> Duration {
    if is_absent(value) {
        return Duration::ZERO;
    }
    let parsed = match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match parsed {
        Some(ms) => Duration::from_millis(ms),
        None => {
            errors.push(SLEEP_INPUT, "must be a non-negative integer");
            Duration::ZERO
        }
    }
}

fn validate_api_url(value: Option<&str>, errors: &mut ValidationErrors) -> Option<String> {
    let text = non_blank(value)?;
    match url::Url::parse(text) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            Some(text.trim_end_matches('/').to_string())
        }
        Ok(_) => {
            errors.push(API_URL_INPUT, "must use http or https");
            None
        }
        Err(e) => {
            errors.push(API_URL_INPUT, format!("is not a valid URL ({})", e));
            None
        }
    }
}
