use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Footer key that always marks a breaking change, regardless of configuration
pub const BREAKING_CHANGE_FOOTER_KEY: &str = "BREAKING CHANGE";

/// Metadata entry holding the breaking change description
pub const BREAKING_CHANGE_METADATA_KEY: &str = "breaking-change";

/// Metadata entry holding the issue id
pub const ISSUE_METADATA_KEY: &str = "issue";

/// A commit message split according to conventional commits.
///
/// `metadata` holds one value per configured footer, keyed by the footer's
/// logical name (`issue`, `breaking-change`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitMessage {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub r#type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_breaking_change: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl CommitMessage {
    /// Build a message from its parts.
    ///
    /// Empty `scope`, `issue` or `breaking_change` are treated as absent. A
    /// non-empty `breaking_change` marks the message as breaking.
    pub fn new(
        r#type: impl Into<String>,
        scope: impl Into<String>,
        description: impl Into<String>,
        body: impl Into<String>,
        issue: impl Into<String>,
        breaking_change: impl Into<String>,
    ) -> Self {
        let scope = scope.into();
        let issue = issue.into();
        let breaking_change = breaking_change.into();

        let mut metadata = BTreeMap::new();
        if !issue.is_empty() {
            metadata.insert(ISSUE_METADATA_KEY.to_string(), issue);
        }
        let is_breaking_change = !breaking_change.is_empty();
        if is_breaking_change {
            metadata.insert(BREAKING_CHANGE_METADATA_KEY.to_string(), breaking_change);
        }

        CommitMessage {
            r#type: r#type.into(),
            scope: (!scope.is_empty()).then_some(scope),
            description: description.into(),
            body: body.into(),
            is_breaking_change,
            metadata,
        }
    }

    /// Issue id captured from the footer, empty when absent
    pub fn issue(&self) -> &str {
        self.metadata
            .get(ISSUE_METADATA_KEY)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Breaking change description captured from the footer, empty when absent
    pub fn breaking_message(&self) -> &str {
        self.metadata
            .get(BREAKING_CHANGE_METADATA_KEY)
            .map(String::as_str)
            .unwrap_or_default()
    }
}
