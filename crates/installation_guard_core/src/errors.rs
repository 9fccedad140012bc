use std::fmt;

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Result type for operations of this crate.
pub type GuardResult<T> = Result<T, Error>;

/// Errors that stop a run before any owner is processed.
///
/// Failures during an owner's processing never surface as an `Error`; they are
/// logged and recorded as that owner's status instead.
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration could not be parsed or validated.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A GitHub client could not be constructed.
    #[error("GitHub client error: {0}")]
    GitHub(#[from] github_client::Error),
}

/// Errors produced while loading the run configuration.
///
/// Token values never appear in these messages.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An input that must contain JSON could not be parsed.
    #[error("Input '{input}' is not valid JSON: {source}")]
    InvalidJson {
        input: String,
        #[source]
        source: serde_json::Error,
    },

    /// The inputs parsed but did not describe a valid configuration.
    #[error("{0}")]
    Validation(ValidationErrors),
}

/// A single problem found while validating the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Location of the offending value, e.g. `owners[1].installId`.
    pub path: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Every issue found by one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(pub Vec<ValidationIssue>);

impl ValidationErrors {
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(ValidationIssue::new(path, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration")?;
        for (i, issue) in self.0.iter().enumerate() {
            let separator = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}", separator, issue)?;
        }
        Ok(())
    }
}
