use chrono::{DateTime, Utc};
use semver::Version;
use std::collections::BTreeSet;

use crate::domain::GitCommitLog;

/// Commits grouped under one configured heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitsSection {
    pub name: String,
    /// Commit types declared for this section in configuration
    pub types: Vec<String>,
    /// Commits in first-seen order
    pub items: Vec<GitCommitLog>,
}

/// Breaking change descriptions collected from footers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakingChangeSection {
    pub name: String,
    /// One entry per breaking commit, in log order
    pub messages: Vec<String>,
}

/// A release note section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseNoteSection {
    Commits(CommitsSection),
    BreakingChanges(BreakingChangeSection),
}

impl ReleaseNoteSection {
    pub fn name(&self) -> &str {
        match self {
            ReleaseNoteSection::Commits(section) => &section.name,
            ReleaseNoteSection::BreakingChanges(section) => &section.name,
        }
    }
}

/// Release note for one version, tag or commit range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseNote {
    pub version: Option<Version>,
    pub tag: String,
    /// Truncated to the minute
    pub date: Option<DateTime<Utc>>,
    /// Sections in configured order; empty sections are never present
    pub sections: Vec<ReleaseNoteSection>,
    pub author_names: BTreeSet<String>,
}

impl ReleaseNote {
    /// Find a section by its configured name
    pub fn section(&self, name: &str) -> Option<&ReleaseNoteSection> {
        self.sections.iter().find(|section| section.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_name() {
        let commits = ReleaseNoteSection::Commits(CommitsSection {
            name: "Features".to_string(),
            types: vec!["feat".to_string()],
            items: vec![],
        });
        let breaking = ReleaseNoteSection::BreakingChanges(BreakingChangeSection {
            name: "Breaking Changes".to_string(),
            messages: vec!["boom".to_string()],
        });
        assert_eq!(commits.name(), "Features");
        assert_eq!(breaking.name(), "Breaking Changes");
    }

    #[test]
    fn test_find_section() {
        let note = ReleaseNote {
            version: None,
            tag: String::new(),
            date: None,
            sections: vec![ReleaseNoteSection::BreakingChanges(BreakingChangeSection {
                name: "Breaking Changes".to_string(),
                messages: vec!["boom".to_string()],
            })],
            author_names: BTreeSet::new(),
        };
        assert!(note.section("Breaking Changes").is_some());
        assert!(note.section("Features").is_none());
    }
}
