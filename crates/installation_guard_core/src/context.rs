//! Per-owner execution contexts.
//!
//! Each owner gets its own clients and its own tracing span, so nothing an
//! owner does can leak into another owner's processing: token cursors are
//! per owner, and every log line emitted while processing an owner carries
//! its login.

use github_client::{
    ClientOptions, InstallationRepositoriesClient, RepositoryPropertiesClient, TokenRotator,
};
use secrecy::SecretString;
use tracing::{info_span, Span};

use crate::config::{Config, Owner};
use crate::errors::GuardResult;

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;

/// Builds the GitHub clients used for one owner.
pub trait ClientFactory {
    /// Client used to read the owner's repository custom property values.
    fn properties_client(
        &self,
        owner: &Owner,
    ) -> Result<Box<dyn RepositoryPropertiesClient>, github_client::Error>;

    /// Client used to add and remove repositories on the owner's installation.
    fn installation_client(
        &self,
        owner: &Owner,
    ) -> Result<Box<dyn InstallationRepositoriesClient>, github_client::Error>;
}

/// Builds [`TokenRotator`]s: one over the owner's fine-grained token and one
/// over the shared pool of classic tokens.
///
/// Every owner gets a fresh classic rotator, so each owner's rotation starts at
/// the first classic token.
pub struct RotatingClientFactory<'a> {
    classic_pats: &'a [SecretString],
    options: ClientOptions,
}

impl<'a> RotatingClientFactory<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            classic_pats: &config.classic_pats,
            options: config.client_options(),
        }
    }
}

impl ClientFactory for RotatingClientFactory<'_> {
    fn properties_client(
        &self,
        owner: &Owner,
    ) -> Result<Box<dyn RepositoryPropertiesClient>, github_client::Error> {
        let tokens = std::slice::from_ref(&owner.fine_grained_pat);
        Ok(Box::new(TokenRotator::new(tokens, &self.options)?))
    }

    fn installation_client(
        &self,
        _owner: &Owner,
    ) -> Result<Box<dyn InstallationRepositoriesClient>, github_client::Error> {
        Ok(Box::new(TokenRotator::new(
            self.classic_pats,
            &self.options,
        )?))
    }
}

/// Everything needed to process one owner.
pub struct OwnerContext {
    login: String,
    install_id: u64,
    skip: bool,
    properties: Box<dyn RepositoryPropertiesClient>,
    installation: Box<dyn InstallationRepositoriesClient>,
    span: Span,
}

impl OwnerContext {
    pub fn new(
        login: impl Into<String>,
        install_id: u64,
        skip: bool,
        properties: Box<dyn RepositoryPropertiesClient>,
        installation: Box<dyn InstallationRepositoriesClient>,
    ) -> Self {
        let login = login.into();
        let span = info_span!("owner", login = %login);
        Self {
            login,
            install_id,
            skip,
            properties,
            installation,
            span,
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn install_id(&self) -> u64 {
        self.install_id
    }

    pub fn skip(&self) -> bool {
        self.skip
    }

    /// Client bound to the owner's fine-grained token.
    pub fn properties(&self) -> &dyn RepositoryPropertiesClient {
        self.properties.as_ref()
    }

    /// Client rotating over the classic token pool.
    pub fn installation(&self) -> &dyn InstallationRepositoriesClient {
        self.installation.as_ref()
    }

    /// Span under which all of this owner's work is logged.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

/// Builds one context per configured owner, in configuration order.
///
/// # Errors
///
/// Returns an error if any client cannot be constructed. This happens before
/// any owner is processed, so a failure aborts the whole run.
pub fn build_owner_contexts(
    config: &Config,
    factory: &dyn ClientFactory,
) -> GuardResult<Vec<OwnerContext>> {
    config
        .owners
        .iter()
        .map(|owner| {
            Ok(OwnerContext::new(
                owner.login.clone(),
                owner.install_id,
                owner.skip,
                factory.properties_client(owner)?,
                factory.installation_client(owner)?,
            ))
        })
        .collect()
}
