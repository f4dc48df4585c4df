use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::CommitMessage;

/// A commit from the log with its parsed message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitCommitLog {
    /// Commit date formatted as `YYYY-MM-DD`
    pub date: String,
    pub hash: String,
    pub author_name: String,
    pub message: CommitMessage,
}

impl GitCommitLog {
    pub fn new(
        date: impl Into<String>,
        hash: impl Into<String>,
        author_name: impl Into<String>,
        message: CommitMessage,
    ) -> Self {
        GitCommitLog {
            date: date.into(),
            hash: hash.into(),
            author_name: author_name.into(),
            message,
        }
    }
}

/// Represents a git tag and the moment it was created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitTag {
    pub name: String,
    /// Tagger time for annotated tags, commit time for lightweight ones
    pub date: Option<DateTime<Utc>>,
}

impl GitTag {
    /// Create a new tag from a name and optional date
    pub fn new(name: impl Into<String>, date: Option<DateTime<Utc>>) -> Self {
        GitTag {
            name: name.into(),
            date,
        }
    }
}
