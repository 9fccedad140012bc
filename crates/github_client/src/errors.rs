//! Error types for GitHub client operations.
//!
//! This module defines the error types that can occur when interacting with the GitHub API
//! through the github_client crate. Callers in the reconciliation flow only need to log
//! these errors and decide whether an owner failed, so the variants carry enough context
//! for a useful log line and nothing more.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitHub client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use github_client::{Error, InstallationRepositoriesClient};
///
/// match client.remove_repository_from_installation(42, 1296269).await {
///     Ok(status) => println!("Removed (status: {})", status),
///     Err(Error::NotFound) => eprintln!("Repository or installation not found"),
///     Err(Error::RateLimitExceeded) => eprintln!("Rate limit exceeded, retry later"),
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// GitHub answered with a non-success status that has no more specific variant.
    ///
    /// The status code and the `message` field of GitHub's error body are kept so
    /// that the failure can be logged next to the repository it concerns.
    #[error("API request failed with status {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Authentication or GitHub client initialization failure.
    ///
    /// This error occurs when:
    /// - A token is rejected by GitHub (HTTP 401)
    /// - The octocrab client cannot be built
    /// - A token pool is empty
    #[error("Failed to authenticate or initialize GitHub client: {0}")]
    AuthError(String),

    /// Error deserializing the response from GitHub.
    #[error("Failed to deserialize GitHub response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The GitHub API returned a response in an unexpected format, or the request
    /// could not be completed at the transport level.
    #[error("Invalid response format")]
    InvalidResponse,

    /// A request URI or the configured API base URI could not be parsed.
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    /// The requested resource was not found.
    ///
    /// GitHub also answers 404 when the token cannot see the resource, so this
    /// frequently means missing permissions rather than a missing repository.
    #[error("Resource not found")]
    NotFound,

    /// GitHub API rate limit has been exceeded.
    ///
    /// Raised for 403/429 answers whose message mentions the rate limit, which
    /// covers both primary and secondary rate limits.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl Error {
    /// Maps an octocrab error to a client error, using the HTTP status of GitHub
    /// error responses where one is available.
    pub(crate) fn from_octocrab(e: &octocrab::Error) -> Self {
        match e {
            octocrab::Error::GitHub { source, .. } => {
                Self::from_status(source.status_code.as_u16(), &source.message)
            }
            octocrab::Error::Serde { .. } | octocrab::Error::Json { .. } => Self::InvalidResponse,
            octocrab::Error::Uri { source, .. } => Self::InvalidUri(source.to_string()),
            octocrab::Error::UriParse { source, .. } => Self::InvalidUri(source.to_string()),
            _ => Self::InvalidResponse,
        }
    }

    /// Classifies a failed GitHub response by status code and error message.
    pub fn from_status(status: u16, message: &str) -> Self {
        match status {
            401 => Self::AuthError(message.to_string()),
            404 => Self::NotFound,
            403 | 429 if message.to_ascii_lowercase().contains("rate limit") => {
                Self::RateLimitExceeded
            }
            _ => Self::ApiError {
                status,
                message: message.to_string(),
            },
        }
    }
}
