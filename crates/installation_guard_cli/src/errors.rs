use std::io;

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Process exit code when every owner finished without failure.
pub const EXIT_SUCCESS: i32 = 0;

/// Process exit code when at least one owner ended in failure.
pub const EXIT_RUN_FAILED: i32 = 1;

/// Process exit code when the run could not start.
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Errors that can occur in the installation-guard CLI.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error occurred while loading the configuration file.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read a file from the filesystem.
    #[error("Failed to load file: {0}")]
    LoadFile(#[source] io::Error),

    /// The configuration file is not valid TOML, or does not have the expected shape.
    #[error("Failed to parse TOML configuration file: {0}")]
    ParseTomlFile(#[source] toml::de::Error),

    /// Validation of the inputs, or construction of the GitHub clients, failed.
    #[error(transparent)]
    Guard(#[from] installation_guard_core::Error),

    /// At least one owner ended in failure.
    #[error("Run failed; check logs for details")]
    RunFailed,
}

impl From<installation_guard_core::ConfigError> for Error {
    fn from(e: installation_guard_core::ConfigError) -> Self {
        Error::Guard(e.into())
    }
}

impl Error {
    /// The process exit code reported for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::RunFailed => EXIT_RUN_FAILED,
            _ => EXIT_CONFIG_ERROR,
        }
    }
}
