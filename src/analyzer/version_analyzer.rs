use semver::Version;
use std::collections::HashSet;

use crate::config::{CommitMessageConfig, VersioningConfig};
use crate::domain::{bump_version, GitCommitLog, VersionBump};
use crate::error::Result;

/// Decides how far a set of commits moves the version
#[derive(Debug, Clone)]
pub struct VersionAnalyzer {
    major: HashSet<String>,
    minor: HashSet<String>,
    patch: HashSet<String>,
    known_types: HashSet<String>,
    include_unknown_as_patch: bool,
}

impl VersionAnalyzer {
    /// Create a new version analyzer
    ///
    /// # Arguments
    /// * `versioning` - Commit types for each bump level
    /// * `message` - Known commit types, used for the unknown type rule
    pub fn new(versioning: &VersioningConfig, message: &CommitMessageConfig) -> Self {
        let set = |types: &[String]| types.iter().cloned().collect::<HashSet<_>>();
        VersionAnalyzer {
            major: set(&versioning.update_major),
            minor: set(&versioning.update_minor),
            patch: set(&versioning.update_patch),
            known_types: set(&message.types),
            include_unknown_as_patch: !versioning.ignore_unknown,
        }
    }

    /// Bump level warranted by a single commit
    pub fn classify(&self, commit: &GitCommitLog) -> VersionBump {
        let message = &commit.message;
        let commit_type = message.r#type.as_str();

        if message.is_breaking_change || self.major.contains(commit_type) {
            VersionBump::Major
        } else if self.minor.contains(commit_type) {
            VersionBump::Minor
        } else if self.patch.contains(commit_type) {
            VersionBump::Patch
        } else if self.include_unknown_as_patch && !self.known_types.contains(commit_type) {
            VersionBump::Patch
        } else {
            VersionBump::None
        }
    }

    /// Highest bump level across `commits`, `None` for an empty list
    pub fn bump_for(&self, commits: &[GitCommitLog]) -> VersionBump {
        commits
            .iter()
            .map(|commit| self.classify(commit))
            .max()
            .unwrap_or_default()
    }

    /// Compute the version following `current`.
    ///
    /// # Returns
    /// * `Ok((next, updated))` - The next version and whether any commit
    ///   warranted a bump. Without a current version `next` is `None`, but
    ///   `updated` is still computed from the commits.
    /// * `Err` - If the bumped component of `current` would overflow
    pub fn next_version(
        &self,
        current: Option<&Version>,
        commits: &[GitCommitLog],
    ) -> Result<(Option<Version>, bool)> {
        let bump = self.bump_for(commits);
        let updated = bump != VersionBump::None;
        let next = current
            .map(|version| bump_version(version, bump))
            .transpose()?;
        Ok((next, updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CommitMessage;

    fn commit(commit_type: &str, breaking: bool) -> GitCommitLog {
        let mut message = CommitMessage::new(commit_type, "", "something", "", "", "");
        message.is_breaking_change = breaking;
        GitCommitLog::new("2024-01-01", "abc1234", "Author", message)
    }

    fn analyzer() -> VersionAnalyzer {
        VersionAnalyzer::new(&VersioningConfig::default(), &CommitMessageConfig::default())
    }

    fn version(value: &str) -> Version {
        Version::parse(value).unwrap()
    }

    #[test]
    fn test_classify_by_type() {
        let analyzer = analyzer();
        assert_eq!(analyzer.classify(&commit("feat", false)), VersionBump::Minor);
        assert_eq!(analyzer.classify(&commit("fix", false)), VersionBump::Patch);
        assert_eq!(analyzer.classify(&commit("fix", true)), VersionBump::Major);
    }

    #[test]
    fn test_classify_major_type() {
        let versioning = VersioningConfig {
            update_major: vec!["epic".to_string()],
            ..VersioningConfig::default()
        };
        let analyzer = VersionAnalyzer::new(&versioning, &CommitMessageConfig::default());
        assert_eq!(analyzer.classify(&commit("epic", false)), VersionBump::Major);
    }

    #[test]
    fn test_classify_unknown_type() {
        assert_eq!(analyzer().classify(&commit("chore2", false)), VersionBump::Patch);

        let versioning = VersioningConfig {
            ignore_unknown: true,
            ..VersioningConfig::default()
        };
        let ignoring = VersionAnalyzer::new(&versioning, &CommitMessageConfig::default());
        assert_eq!(ignoring.classify(&commit("chore2", false)), VersionBump::None);
    }

    #[test]
    fn test_classify_known_type_without_bump() {
        // "revert" is a known type that no versioning list mentions
        assert_eq!(analyzer().classify(&commit("revert", false)), VersionBump::None);
    }

    #[test]
    fn test_next_version_patch() {
        let (next, updated) = analyzer()
            .next_version(Some(&version("0.0.0")), &[commit("fix", false)])
            .unwrap();
        assert_eq!(next, Some(version("0.0.1")));
        assert!(updated);
    }

    #[test]
    fn test_next_version_breaking_overrides_type() {
        let (next, updated) = analyzer()
            .next_version(Some(&version("1.2.3")), &[commit("fix", true)])
            .unwrap();
        assert_eq!(next, Some(version("2.0.0")));
        assert!(updated);
    }

    #[test]
    fn test_next_version_takes_maximum() {
        let commits = vec![
            commit("fix", false),
            commit("feat", false),
            commit("docs", false),
        ];
        let (next, _) = analyzer().next_version(Some(&version("1.2.3")), &commits).unwrap();
        assert_eq!(next, Some(version("1.3.0")));
    }

    #[test]
    fn test_next_version_ignores_order() {
        let forward = vec![commit("fix", false), commit("feat", true)];
        let backward = vec![commit("feat", true), commit("fix", false)];
        let current = version("0.4.1");
        assert_eq!(
            analyzer().next_version(Some(&current), &forward).unwrap(),
            analyzer().next_version(Some(&current), &backward).unwrap()
        );
    }

    #[test]
    fn test_next_version_without_commits() {
        let (next, updated) = analyzer().next_version(Some(&version("1.2.3")), &[]).unwrap();
        assert_eq!(next, Some(version("1.2.3")));
        assert!(!updated);
    }

    #[test]
    fn test_next_version_without_current_version() {
        let (next, updated) = analyzer().next_version(None, &[commit("feat", false)]).unwrap();
        assert_eq!(next, None);
        assert!(updated);
    }

    #[test]
    fn test_next_version_overflow_is_error() {
        let current = Version::new(1, u64::MAX, 0);
        assert!(analyzer()
            .next_version(Some(&current), &[commit("feat", false)])
            .is_err());
    }

    #[test]
    fn test_next_version_unknown_type_bumps_patch() {
        let (next, updated) = analyzer()
            .next_version(Some(&version("0.0.0")), &[commit("chore2", false)])
            .unwrap();
        assert_eq!(next, Some(version("0.0.1")));
        assert!(updated);
    }
}
