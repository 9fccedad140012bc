//! Crate for interacting with the GitHub REST API.
//!
//! This crate provides a client for the small set of endpoints needed to keep a
//! GitHub App installation's repository list in line with an organization's
//! custom repository properties:
//!
//! - `GET /orgs/{org}/properties/values` (paginated)
//! - `PUT /user/installations/{installation_id}/repositories/{repository_id}`
//! - `DELETE /user/installations/{installation_id}/repositories/{repository_id}`
//!
//! Every request made through a [`GitHubClient`] runs a fixed post-call pipeline:
//! rate-limit telemetry is logged, then the optional pacing delay is applied,
//! and only then is the response decoded and handed back to the caller.
//! [`TokenRotator`] spreads calls over a pool of tokens.

use std::time::Duration;

use async_trait::async_trait;
use http::{StatusCode, Uri};
use octocrab::{FromResponse, Octocrab, Page};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, Span};

pub mod errors;
pub use errors::Error;

pub mod custom_property;
pub use custom_property::{CustomPropertyValue, PropertyValue, RepositoryPropertyValues};

pub mod rate_limit;
pub use rate_limit::RateLimitStatus;

pub mod rotator;
pub use rotator::TokenRotator;

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Number of items requested per page from paginated endpoints.
pub const PAGE_SIZE: u32 = 100;

/// Options shared by every client created from a token pool.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Base URI of the REST API. `None` uses octocrab's default (`https://api.github.com`).
    pub base_uri: Option<String>,

    /// Fixed delay applied after every request. Zero disables pacing.
    pub pacing: Duration,
}

/// Read access to an organization's repository custom property values.
#[async_trait]
pub trait RepositoryPropertiesClient: Send + Sync {
    /// Lists the custom property values of every repository in an organization.
    ///
    /// All pages are drained before returning.
    ///
    /// # Arguments
    ///
    /// * `org` - The organization login.
    /// * `repository_query` - Optional repository search qualifier, e.g. `archived:false`.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails or cannot be decoded.
    async fn list_repository_property_values(
        &self,
        org: &str,
        repository_query: Option<&str>,
    ) -> Result<Vec<RepositoryPropertyValues>, Error>;
}

/// Management of the repositories attached to a GitHub App installation.
///
/// Both calls act on behalf of the authenticated user, which must have admin
/// access to the repository and access to the installation.
#[async_trait]
pub trait InstallationRepositoriesClient: Send + Sync {
    /// Adds a repository to an installation. Returns the HTTP status code.
    async fn add_repository_to_installation(
        &self,
        installation_id: u64,
        repository_id: u64,
    ) -> Result<u16, Error>;

    /// Removes a repository from an installation. Returns the HTTP status code.
    async fn remove_repository_from_installation(
        &self,
        installation_id: u64,
        repository_id: u64,
    ) -> Result<u16, Error>;
}

/// A client for interacting with the GitHub API, authenticated with a single token.
///
/// The client wraps octocrab's raw request methods so that response headers are
/// visible. After each request it logs the request URL and the rate-limit headers,
/// then sleeps for the configured pacing delay, and only then maps error statuses
/// and decodes the body.
#[derive(Debug)]
pub struct GitHubClient {
    client: Octocrab,
    pacing: Duration,
    slot: usize,
    pool_size: usize,
}

impl GitHubClient {
    /// Creates a new `GitHubClient` around an authenticated octocrab instance.
    ///
    /// The client has no pacing delay and is treated as the only token of its pool.
    pub fn new(client: Octocrab) -> Self {
        Self {
            client,
            pacing: Duration::ZERO,
            slot: 0,
            pool_size: 1,
        }
    }

    /// Sets the delay applied after every request.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Records the position of this client's token in its pool.
    ///
    /// For pools with more than one token, request telemetry is emitted inside a
    /// `token` span with `slot = "i/N"` so log lines can be tied to a credential.
    pub fn with_slot(mut self, slot: usize, pool_size: usize) -> Self {
        self.slot = slot;
        self.pool_size = pool_size;
        self
    }

    /// Span for the telemetry of one call.
    ///
    /// Created per call so it nests under the span current at the call site.
    fn token_span(&self) -> Span {
        if self.pool_size > 1 {
            tracing::debug_span!("token", slot = %format!("{}/{}", self.slot + 1, self.pool_size))
        } else {
            Span::none()
        }
    }

    /// Zero-based position of this client's token in its pool.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// The pacing delay applied after every request.
    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    /// Runs the post-call pipeline for a completed request.
    ///
    /// Transport failures still count as a call: they are logged and paced like
    /// any other response before the error is returned.
    async fn complete<B>(
        &self,
        url: &str,
        result: octocrab::Result<http::Response<B>>,
    ) -> Result<http::Response<B>, Error> {
        let span = self.token_span();
        match &result {
            Ok(response) => span.in_scope(|| {
                log_rate_limit(url, response.status(), response.headers())
            }),
            Err(_) => span.in_scope(|| debug!(url = url, "GitHub API request did not complete")),
        }

        self.pace(&span).await;

        result.map_err(|e| {
            let mapped = Error::from_octocrab(&e);
            log_octocrab_error("GitHub API request failed", e);
            mapped
        })
    }

    async fn pace(&self, span: &Span) {
        if self.pacing.is_zero() {
            return;
        }
        span.in_scope(|| {
            debug!(
                delay_ms = self.pacing.as_millis() as u64,
                "Pausing between requests"
            )
        });
        tokio::time::sleep(self.pacing).await;
    }

    async fn get_page<T>(&self, uri: Uri) -> Result<Page<T>, Error>
    where
        T: DeserializeOwned + Send,
    {
        let url = uri.to_string();
        let response = self.complete(&url, self.client._get(uri).await).await?;
        let response = octocrab::map_github_error(response)
            .await
            .map_err(|e| octocrab_failure("GitHub returned an error for page request", e))?;

        Page::<T>::from_response(response)
            .await
            .map_err(|e| octocrab_failure("Failed to decode page", e))
    }

    async fn installation_request(
        &self,
        method: http::Method,
        installation_id: u64,
        repository_id: u64,
    ) -> Result<u16, Error> {
        let uri = parse_uri(&installation_repository_route(
            installation_id,
            repository_id,
        ))?;
        let url = uri.to_string();

        let result = if method == http::Method::PUT {
            self.client._put(uri, None::<&()>).await
        } else {
            self.client._delete(uri, None::<&()>).await
        };
        let response = self.complete(&url, result).await?;
        let response = octocrab::map_github_error(response).await.map_err(|e| {
            octocrab_failure("GitHub returned an error for installation request", e)
        })?;

        Ok(response.status().as_u16())
    }
}

#[async_trait]
impl RepositoryPropertiesClient for GitHubClient {
    #[instrument(skip(self), fields(org = %org))]
    async fn list_repository_property_values(
        &self,
        org: &str,
        repository_query: Option<&str>,
    ) -> Result<Vec<RepositoryPropertyValues>, Error> {
        let mut next = Some(parse_uri(&property_values_route(org, repository_query))?);
        let mut values = Vec::new();
        let mut pages = 0usize;

        while let Some(uri) = next.take() {
            let page: Page<RepositoryPropertyValues> = self.get_page(uri).await?;
            pages += 1;
            values.extend(page.items);
            next = page.next;
        }

        debug!(
            org = org,
            pages = pages,
            count = values.len(),
            "Retrieved repository custom property values"
        );
        Ok(values)
    }
}

#[async_trait]
impl InstallationRepositoriesClient for GitHubClient {
    #[instrument(skip(self))]
    async fn add_repository_to_installation(
        &self,
        installation_id: u64,
        repository_id: u64,
    ) -> Result<u16, Error> {
        self.installation_request(http::Method::PUT, installation_id, repository_id)
            .await
    }

    #[instrument(skip(self))]
    async fn remove_repository_from_installation(
        &self,
        installation_id: u64,
        repository_id: u64,
    ) -> Result<u16, Error> {
        self.installation_request(http::Method::DELETE, installation_id, repository_id)
            .await
    }
}

/// Builds the first-page route of the custom property values listing.
///
/// # Examples
///
/// ```
/// use github_client::property_values_route;
///
/// assert_eq!(
///     property_values_route("acme", Some("archived:false")),
///     "/orgs/acme/properties/values?per_page=100&repository_query=archived%3Afalse"
/// );
/// ```
pub fn property_values_route(org: &str, repository_query: Option<&str>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("per_page", &PAGE_SIZE.to_string());
    if let Some(q) = repository_query {
        query.append_pair("repository_query", q);
    }
    format!("/orgs/{}/properties/values?{}", org, query.finish())
}

/// Builds the route used to add or remove a repository from an installation.
pub fn installation_repository_route(installation_id: u64, repository_id: u64) -> String {
    format!(
        "/user/installations/{}/repositories/{}",
        installation_id, repository_id
    )
}

/// Creates an `Octocrab` client authenticated with a personal access token.
///
/// Works for both classic and fine-grained tokens.
///
/// # Arguments
///
/// * `token` - The personal access token.
/// * `base_uri` - Optional API base URI, for GitHub Enterprise Server or tests.
///
/// # Errors
///
/// Returns `Error::InvalidUri` if the base URI cannot be parsed and
/// `Error::AuthError` if the client cannot be built.
#[instrument(skip(token))]
pub fn create_token_client(token: &str, base_uri: Option<&str>) -> Result<Octocrab, Error> {
    let mut builder = Octocrab::builder().personal_token(token.to_string());
    if let Some(uri) = base_uri {
        builder = builder.base_uri(uri).map_err(|e| {
            error!(base_uri = uri, "Failed to parse GitHub API base URI");
            Error::InvalidUri(format!("{}: {}", uri, e))
        })?;
    }

    builder.build().map_err(|e| {
        error!(error = ?e, "Failed to build Octocrab client with token credentials");
        Error::AuthError("Failed to build a GitHub client for the supplied token.".to_string())
    })
}

fn log_rate_limit(url: &str, status: StatusCode, headers: &http::HeaderMap) {
    let rate_limit = RateLimitStatus::from_headers(headers);

    debug!(url = url, status = status.as_u16(), "GitHub API request");
    debug!(
        "x-ratelimit-remaining: {}",
        rate_limit.remaining.as_deref().unwrap_or("unknown")
    );
    debug!(
        "x-ratelimit-limit: {}",
        rate_limit.limit.as_deref().unwrap_or("unknown")
    );
    if let Some(reset) = rate_limit.reset {
        debug!("x-ratelimit-reset: {}", reset.format("%Y-%m-%d %H:%M:%S %:z"));
    }
}

fn parse_uri(route: &str) -> Result<Uri, Error> {
    route
        .parse::<Uri>()
        .map_err(|e| Error::InvalidUri(format!("{}: {}", route, e)))
}

fn octocrab_failure(message: &str, e: octocrab::Error) -> Error {
    let mapped = Error::from_octocrab(&e);
    log_octocrab_error(message, e);
    mapped
}

fn log_octocrab_error(message: &str, e: octocrab::Error) {
    match e {
        octocrab::Error::GitHub { source, .. } => error!(
            status = source.status_code.as_u16(),
            error_message = source.message,
            "{}. Received an error from GitHub",
            message
        ),
        octocrab::Error::UriParse { source, .. } => error!(
            error_message = source.to_string(),
            "{}. Failed to parse URI.",
            message
        ),
        octocrab::Error::Uri { source, .. } => error!(
            error_message = source.to_string(),
            "{}. Failed to parse URI.",
            message
        ),
        octocrab::Error::InvalidHeaderValue { source, .. } => error!(
            error_message = source.to_string(),
            "{}. One of the header values was invalid.",
            message
        ),
        octocrab::Error::InvalidUtf8 { source, .. } => error!(
            error_message = source.to_string(),
            "{}. The message wasn't valid UTF-8.",
            message,
        ),
        _ => error!(error_message = e.to_string(), message),
    };
}
