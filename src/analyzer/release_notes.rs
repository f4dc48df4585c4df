use chrono::{DateTime, Timelike, Utc};
use semver::Version;
use std::collections::{BTreeSet, HashMap};

use crate::config::{ReleaseNotesConfig, SectionType};
use crate::domain::{
    BreakingChangeSection, CommitsSection, GitCommitLog, ReleaseNote, ReleaseNoteSection,
};
use crate::error::Result;

/// Groups commits into the configured release note sections
#[derive(Debug, Clone)]
pub struct ReleaseNoteProcessor {
    config: ReleaseNotesConfig,
}

impl ReleaseNoteProcessor {
    /// Create a processor; the section layout is validated once here
    pub fn new(config: ReleaseNotesConfig) -> Result<Self> {
        config.validate()?;
        Ok(ReleaseNoteProcessor { config })
    }

    /// Build the release note for a set of commits.
    ///
    /// Sections follow the configured order and sections without content are
    /// left out. `date` is truncated to the minute.
    ///
    /// # Arguments
    /// * `version` - Version being released, if any
    /// * `tag` - Tag name the note belongs to, may be empty
    /// * `date` - Release date
    /// * `commits` - Commits in log order
    pub fn create(
        &self,
        version: Option<Version>,
        tag: &str,
        date: Option<DateTime<Utc>>,
        commits: &[GitCommitLog],
    ) -> ReleaseNote {
        let mut section_of_type: HashMap<&str, usize> = HashMap::new();
        for (index, section) in self.config.sections.iter().enumerate() {
            if section.section_type == SectionType::Commits {
                for commit_type in &section.commit_types {
                    section_of_type.insert(commit_type.as_str(), index);
                }
            }
        }

        let mut items: HashMap<usize, Vec<GitCommitLog>> = HashMap::new();
        let mut breaking_messages = Vec::new();
        let mut author_names = BTreeSet::new();

        for commit in commits {
            author_names.insert(commit.author_name.clone());

            if let Some(&index) = section_of_type.get(commit.message.r#type.as_str()) {
                items.entry(index).or_default().push(commit.clone());
            }

            let breaking = commit.message.breaking_message();
            if !breaking.is_empty() {
                breaking_messages.push(breaking.to_string());
            }
        }

        let mut sections = Vec::new();
        for (index, section) in self.config.sections.iter().enumerate() {
            match section.section_type {
                SectionType::Commits => {
                    if let Some(items) = items.remove(&index) {
                        sections.push(ReleaseNoteSection::Commits(CommitsSection {
                            name: section.name.clone(),
                            types: section.commit_types.clone(),
                            items,
                        }));
                    }
                }
                SectionType::BreakingChanges => {
                    if !breaking_messages.is_empty() {
                        sections.push(ReleaseNoteSection::BreakingChanges(BreakingChangeSection {
                            name: section.name.clone(),
                            messages: std::mem::take(&mut breaking_messages),
                        }));
                    }
                }
            }
        }

        ReleaseNote {
            version,
            tag: tag.to_string(),
            date: date.map(truncate_to_minute),
            sections,
            author_names,
        }
    }
}

fn truncate_to_minute(date: DateTime<Utc>) -> DateTime<Utc> {
    date.with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SectionConfig;
    use crate::domain::CommitMessage;
    use chrono::TimeZone;

    fn commit(commit_type: &str, author: &str, breaking: &str) -> GitCommitLog {
        GitCommitLog::new(
            "2024-03-01",
            format!("{}-hash", commit_type),
            author,
            CommitMessage::new(commit_type, "", "something", "", "", breaking),
        )
    }

    fn processor() -> ReleaseNoteProcessor {
        ReleaseNoteProcessor::new(ReleaseNotesConfig::default()).unwrap()
    }

    fn names(note: &ReleaseNote) -> Vec<&str> {
        note.sections.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_sections_follow_configured_order() {
        let commits = vec![commit("fix", "a", ""), commit("feat", "b", "")];
        let note = processor().create(None, "", None, &commits);
        assert_eq!(names(&note), vec!["Features", "Bug Fixes"]);
    }

    #[test]
    fn test_breaking_section_after_commits_sections() {
        let commits = vec![commit("feat", "a", "removes old api"), commit("fix", "a", "")];
        let note = processor().create(None, "", None, &commits);
        assert_eq!(names(&note), vec!["Features", "Bug Fixes", "Breaking Changes"]);

        match note.section("Breaking Changes") {
            Some(ReleaseNoteSection::BreakingChanges(section)) => {
                assert_eq!(section.messages, vec!["removes old api".to_string()]);
            }
            other => panic!("unexpected section: {other:?}"),
        }
    }

    #[test]
    fn test_breaking_section_first_when_configured_first() {
        let config = ReleaseNotesConfig {
            sections: vec![
                SectionConfig::breaking_changes("Breaking"),
                SectionConfig::commits("Features", &["feat"]),
            ],
        };
        let processor = ReleaseNoteProcessor::new(config).unwrap();
        let note = processor.create(None, "", None, &[commit("feat", "a", "boom")]);
        assert_eq!(names(&note), vec!["Breaking", "Features"]);
    }

    #[test]
    fn test_breaking_messages_keep_order_without_dedup() {
        let commits = vec![
            commit("refactor", "a", "same"),
            commit("feat", "a", "other"),
            commit("fix", "a", "same"),
        ];
        let note = processor().create(None, "", None, &commits);
        match note.section("Breaking Changes") {
            Some(ReleaseNoteSection::BreakingChanges(section)) => {
                assert_eq!(section.messages, vec!["same", "other", "same"]);
            }
            other => panic!("unexpected section: {other:?}"),
        }
    }

    #[test]
    fn test_unmapped_types_are_dropped() {
        let note = processor().create(None, "", None, &[commit("docs", "a", "")]);
        assert!(note.sections.is_empty());
        assert_eq!(note.author_names.len(), 1);
    }

    #[test]
    fn test_section_items_in_commit_order() {
        let mut first = commit("feat", "a", "");
        first.hash = "1".to_string();
        let mut second = commit("feat", "a", "");
        second.hash = "2".to_string();
        let note = processor().create(None, "", None, &[first, second]);
        match note.section("Features") {
            Some(ReleaseNoteSection::Commits(section)) => {
                let hashes: Vec<_> = section.items.iter().map(|c| c.hash.as_str()).collect();
                assert_eq!(hashes, vec!["1", "2"]);
                assert_eq!(section.types, vec!["feat".to_string()]);
            }
            other => panic!("unexpected section: {other:?}"),
        }
    }

    #[test]
    fn test_author_names_collapse_duplicates() {
        let commits = vec![
            commit("feat", "Alice", ""),
            commit("fix", "Bob", ""),
            commit("fix", "Alice", ""),
            commit("fix", "alice", ""),
        ];
        let note = processor().create(None, "", None, &commits);
        let authors: Vec<_> = note.author_names.iter().map(String::as_str).collect();
        assert_eq!(authors, vec!["Alice", "Bob", "alice"]);
    }

    #[test]
    fn test_version_tag_and_date() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 45).unwrap();
        let version = Version::new(1, 2, 0);
        let note = processor().create(Some(version.clone()), "v1.2.0", Some(date), &[]);
        assert_eq!(note.version, Some(version));
        assert_eq!(note.tag, "v1.2.0");
        assert_eq!(
            note.date,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap())
        );
        assert!(note.sections.is_empty());
    }

    #[test]
    fn test_duplicate_type_mapping_rejected() {
        let config = ReleaseNotesConfig {
            sections: vec![
                SectionConfig::commits("Fixes", &["fix"]),
                SectionConfig::commits("Also Fixes", &["fix"]),
            ],
        };
        assert!(ReleaseNoteProcessor::new(config).is_err());
    }
}
