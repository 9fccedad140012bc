//! GitHub custom property value types.
//!
//! This module defines the response structures of GitHub's organization-level
//! custom property values API, which reports every repository of an organization
//! together with the custom property values set on it.
//!
//! See: https://docs.github.com/en/rest/orgs/custom-properties

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "custom_property_tests.rs"]
mod tests;

/// The value of a single custom property.
///
/// GitHub returns single-select and string properties as strings and
/// multi-select properties as string arrays. Anything else is kept verbatim
/// so that an unexpected value never fails deserialization of a whole page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A string or single-select value.
    Text(String),
    /// A multi-select value.
    List(Vec<String>),
    /// Any other JSON value, e.g. a typed boolean.
    Other(serde_json::Value),
}

impl PropertyValue {
    /// Returns the value as a string slice when it is a plain string value.
    ///
    /// # Examples
    ///
    /// ```
    /// use github_client::PropertyValue;
    ///
    /// assert_eq!(PropertyValue::Text("true".to_string()).as_str(), Some("true"));
    /// assert_eq!(PropertyValue::Other(serde_json::Value::Bool(true)).as_str(), None);
    /// ```
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

/// A single `{property_name, value}` pair as reported by GitHub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPropertyValue {
    /// Name of the custom property definition.
    pub property_name: String,

    /// The value set on the repository; `None` when the property is unset.
    #[serde(default)]
    pub value: Option<PropertyValue>,
}

/// Custom property values for one repository.
///
/// This is the element type of
/// `GET /orgs/{org}/properties/values`.
///
/// # Examples
///
/// ```
/// use github_client::RepositoryPropertyValues;
///
/// let json = r#"{
///     "repository_id": 1296269,
///     "repository_name": "Hello-World",
///     "repository_full_name": "octocat/Hello-World",
///     "properties": [{ "property_name": "sensitive", "value": "true" }]
/// }"#;
///
/// let values: RepositoryPropertyValues = serde_json::from_str(json).unwrap();
/// assert_eq!(values.repository_id, 1296269);
/// assert_eq!(values.properties.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryPropertyValues {
    /// The stable numeric ID of the repository.
    pub repository_id: u64,

    /// The repository name without its owner.
    #[serde(default)]
    pub repository_name: String,

    /// The full name of the repository (owner/name).
    pub repository_full_name: String,

    /// All custom property values set on the repository.
    #[serde(default)]
    pub properties: Vec<CustomPropertyValue>,
}
