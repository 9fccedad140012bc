//! Round-robin use of a pool of tokens.
//!
//! Spreading calls over several tokens multiplies the primary rate limit
//! available to a run. Each acquisition advances a cursor over the pool and
//! wraps around at the end, so a pool of one token always yields the same
//! client through the same code path.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::{
    create_token_client, ClientOptions, Error, GitHubClient, InstallationRepositoriesClient,
    RepositoryPropertiesClient, RepositoryPropertyValues,
};

#[cfg(test)]
#[path = "rotator_tests.rs"]
mod tests;

/// A pool of [`GitHubClient`]s, one per token, used round-robin.
///
/// The rotator implements the client traits itself. Every trait call acquires
/// the next client, so one operation (including a whole paginated listing)
/// runs on a single token.
#[derive(Debug)]
pub struct TokenRotator {
    clients: Vec<GitHubClient>,
    cursor: AtomicUsize,
}

impl TokenRotator {
    /// Builds one client per token, all sharing the same options.
    ///
    /// # Errors
    ///
    /// Returns `Error::AuthError` if `tokens` is empty, or any error from
    /// [`create_token_client`].
    pub fn new(tokens: &[SecretString], options: &ClientOptions) -> Result<Self, Error> {
        let pool_size = tokens.len();
        let clients = tokens
            .iter()
            .enumerate()
            .map(|(slot, token)| {
                let client = create_token_client(token.expose_secret(), options.base_uri.as_deref())?;
                Ok(GitHubClient::new(client)
                    .with_pacing(options.pacing)
                    .with_slot(slot, pool_size))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Self::from_clients(clients)
    }

    /// Wraps already-built clients. Their order defines the rotation order.
    ///
    /// # Errors
    ///
    /// Returns `Error::AuthError` if `clients` is empty.
    pub fn from_clients(clients: Vec<GitHubClient>) -> Result<Self, Error> {
        if clients.is_empty() {
            return Err(Error::AuthError("token pool is empty".to_string()));
        }
        Ok(Self {
            clients,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Returns the client for the next token in the pool.
    ///
    /// The first call returns the first token's client; after the last token
    /// the rotation starts over.
    pub fn acquire(&self) -> &GitHubClient {
        let len = self.clients.len();
        let slot = self
            .cursor
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |c| Some((c + 1) % len))
            .unwrap_or_else(|c| c);
        let client = &self.clients[slot % len];
        if len > 1 {
            debug!(slot = slot + 1, pool_size = len, "Using token");
        }
        client
    }

    /// Number of tokens in the pool.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Always `false`; an empty pool cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[async_trait]
impl RepositoryPropertiesClient for TokenRotator {
    async fn list_repository_property_values(
        &self,
        org: &str,
        repository_query: Option<&str>,
    ) -> Result<Vec<RepositoryPropertyValues>, Error> {
        self.acquire()
            .list_repository_property_values(org, repository_query)
            .await
    }
}

#[async_trait]
impl InstallationRepositoriesClient for TokenRotator {
    async fn add_repository_to_installation(
        &self,
        installation_id: u64,
        repository_id: u64,
    ) -> Result<u16, Error> {
        self.acquire()
            .add_repository_to_installation(installation_id, repository_id)
            .await
    }

    async fn remove_repository_from_installation(
        &self,
        installation_id: u64,
        repository_id: u64,
    ) -> Result<u16, Error> {
        self.acquire()
            .remove_repository_from_installation(installation_id, repository_id)
            .await
    }
}
