//! Classification of an organization's repositories by the `sensitive`
//! custom property.
//!
//! The classifier reads every non-archived repository visible to the owner's
//! fine-grained token together with its custom property values, then splits
//! the listing into repositories that must not be attached to the installation
//! (`sensitive` is exactly the string `"true"`) and everything else.

use std::collections::{BTreeMap, HashMap};

use github_client::{CustomPropertyValue, PropertyValue, RepositoryPropertyValues};
use tracing::info;

use crate::config::SyncMode;
use crate::context::OwnerContext;

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;

/// Name of the custom property that marks a repository as sensitive.
pub const SENSITIVE_PROPERTY: &str = "sensitive";

/// The only property value that marks a repository as sensitive.
pub const SENSITIVE_VALUE: &str = "true";

/// Repository search qualifier restricting the listing to non-archived repositories.
pub const NON_ARCHIVED_QUERY: &str = "archived:false";

/// A repository as far as the installation is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repo {
    /// Stable numeric repository ID.
    pub id: u64,
    /// `owner/name`.
    pub full_name: String,
}

/// Custom property values of one repository, by property name.
pub type RepoProperties = HashMap<String, Option<PropertyValue>>;

/// Result of classifying an organization's repositories.
///
/// Both lists are sorted by full name, then by ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub sensitive: Vec<Repo>,
    pub non_sensitive: Vec<Repo>,
}

impl Classification {
    /// Total number of repositories classified.
    pub fn len(&self) -> usize {
        self.sensitive.len() + self.non_sensitive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensitive.is_empty() && self.non_sensitive.is_empty()
    }
}

/// Collapses GitHub's `[{property_name, value}]` array into a map.
///
/// A property listed twice keeps its last value.
pub fn collapse_properties(values: &[CustomPropertyValue]) -> RepoProperties {
    values
        .iter()
        .map(|p| (p.property_name.clone(), p.value.clone()))
        .collect()
}

/// Whether a repository's properties mark it as sensitive.
///
/// Only the exact string `"true"` counts. `"TRUE"`, a typed boolean, lists,
/// `null` and a missing property are all non-sensitive.
pub fn is_sensitive(properties: &RepoProperties) -> bool {
    matches!(
        properties.get(SENSITIVE_PROPERTY),
        Some(Some(value)) if value.as_str() == Some(SENSITIVE_VALUE)
    )
}

/// Sorts repositories by full name, then by ID.
pub fn sort_repos(repos: &mut [Repo]) {
    repos.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
}

/// Splits a listing into sensitive and non-sensitive repositories.
///
/// Entries are deduplicated by repository ID; when an ID appears more than
/// once, the entry seen last wins.
pub fn partition(listing: Vec<RepositoryPropertyValues>) -> Classification {
    let by_id: BTreeMap<u64, RepositoryPropertyValues> = listing
        .into_iter()
        .map(|entry| (entry.repository_id, entry))
        .collect();

    let mut classification = Classification::default();
    for (id, entry) in by_id {
        let repo = Repo {
            id,
            full_name: entry.repository_full_name,
        };
        if is_sensitive(&collapse_properties(&entry.properties)) {
            classification.sensitive.push(repo);
        } else {
            classification.non_sensitive.push(repo);
        }
    }

    sort_repos(&mut classification.sensitive);
    sort_repos(&mut classification.non_sensitive);
    classification
}

/// Fetches and classifies all non-archived repositories of an owner.
///
/// Logs the inventory before returning. The non-sensitive list is only
/// logged when `mode` adds repositories.
///
/// # Errors
///
/// Returns the client error if any page of the listing fails.
pub async fn classify(
    context: &OwnerContext,
    mode: SyncMode,
) -> Result<Classification, github_client::Error> {
    let listing = context
        .properties()
        .list_repository_property_values(context.login(), Some(NON_ARCHIVED_QUERY))
        .await?;

    let classification = partition(listing);
    log_inventory(context.login(), &classification, mode);
    Ok(classification)
}

fn log_inventory(login: &str, classification: &Classification, mode: SyncMode) {
    info!("All '{}' repos (visible to supplied token)", login);
    info!("------------------------------");
    info!("");

    info!("Sensitive [{}]:", classification.sensitive.len());
    log_repos(&classification.sensitive);
    info!("");

    if mode.adds_repositories() {
        info!("Non-sensitive [{}]:", classification.non_sensitive.len());
        log_repos(&classification.non_sensitive);
        info!("");
    }
}

fn log_repos(repos: &[Repo]) {
    for repo in repos {
        info!("  {}", repo.full_name);
    }
}
