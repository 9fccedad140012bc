//! Mock GitHub clients shared by the unit tests of this crate.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use github_client::{
    CustomPropertyValue, InstallationRepositoriesClient, PropertyValue,
    RepositoryPropertiesClient, RepositoryPropertyValues,
};

use crate::context::OwnerContext;

/// Builds a listing entry with an optional `sensitive` property value.
pub fn listing_entry(id: u64, full_name: &str, sensitive: Option<PropertyValue>) -> RepositoryPropertyValues {
    let properties = sensitive
        .map(|value| {
            vec![CustomPropertyValue {
                property_name: "sensitive".to_string(),
                value: Some(value),
            }]
        })
        .unwrap_or_default();
    RepositoryPropertyValues {
        repository_id: id,
        repository_name: full_name.rsplit('/').next().unwrap_or(full_name).to_string(),
        repository_full_name: full_name.to_string(),
        properties,
    }
}

pub fn text(value: &str) -> Option<PropertyValue> {
    Some(PropertyValue::Text(value.to_string()))
}

/// Mock listing client returning a fixed set of repositories, or failing.
#[derive(Clone, Default)]
pub struct MockPropertiesClient {
    listing: Vec<RepositoryPropertyValues>,
    fail_with_status: Option<u16>,
    queries: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl MockPropertiesClient {
    pub fn new(listing: Vec<RepositoryPropertyValues>) -> Self {
        Self {
            listing,
            ..Self::default()
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::default()
        }
    }

    /// `(org, repository_query)` of every listing request made so far.
    pub fn queries(&self) -> Vec<(String, Option<String>)> {
        self.queries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl RepositoryPropertiesClient for MockPropertiesClient {
    async fn list_repository_property_values(
        &self,
        org: &str,
        repository_query: Option<&str>,
    ) -> Result<Vec<RepositoryPropertyValues>, github_client::Error> {
        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((org.to_string(), repository_query.map(str::to_string)));
        match self.fail_with_status {
            Some(status) => Err(github_client::Error::from_status(status, "listing failed")),
            None => Ok(self.listing.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationCall {
    Add { installation_id: u64, repository_id: u64 },
    Remove { installation_id: u64, repository_id: u64 },
}

/// Mock installation client recording every call; selected repositories fail.
#[derive(Clone, Default)]
pub struct MockInstallationClient {
    failing_repositories: HashSet<u64>,
    calls: Arc<Mutex<Vec<InstallationCall>>>,
}

impl MockInstallationClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(repository_ids: &[u64]) -> Self {
        Self {
            failing_repositories: repository_ids.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<InstallationCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, call: InstallationCall, repository_id: u64, status: u16) -> Result<u16, github_client::Error> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        if self.failing_repositories.contains(&repository_id) {
            Err(github_client::Error::from_status(403, "Must have admin rights"))
        } else {
            Ok(status)
        }
    }
}

#[async_trait]
impl InstallationRepositoriesClient for MockInstallationClient {
    async fn add_repository_to_installation(
        &self,
        installation_id: u64,
        repository_id: u64,
    ) -> Result<u16, github_client::Error> {
        self.record(
            InstallationCall::Add {
                installation_id,
                repository_id,
            },
            repository_id,
            204,
        )
    }

    async fn remove_repository_from_installation(
        &self,
        installation_id: u64,
        repository_id: u64,
    ) -> Result<u16, github_client::Error> {
        self.record(
            InstallationCall::Remove {
                installation_id,
                repository_id,
            },
            repository_id,
            204,
        )
    }
}

/// Builds a context over mock clients. The mocks share their call logs with
/// the clones kept by the caller.
pub fn mock_context(
    login: &str,
    install_id: u64,
    skip: bool,
    properties: &MockPropertiesClient,
    installation: &MockInstallationClient,
) -> OwnerContext {
    OwnerContext::new(
        login,
        install_id,
        skip,
        Box::new(properties.clone()),
        Box::new(installation.clone()),
    )
}
