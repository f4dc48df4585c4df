use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::GitTag;
use crate::error::{GitSvError, Result};
use crate::git::{CommitRecord, LogRange, LogRangeKind, Repository};

/// Mock repository for testing without actual git operations.
///
/// Commits are stored oldest first. Tags point at a commit hash; ranges are
/// resolved against that list, so `log` behaves like a linear history.
pub struct MockRepository {
    commits: Vec<CommitRecord>,
    tags: Vec<(GitTag, String)>,
    branch: Option<String>,
    detached: bool,
    created_commits: Mutex<Vec<(String, String, String)>>,
    created_tags: Mutex<Vec<(String, String)>>,
    pushed_tags: Mutex<Vec<(String, String)>>,
}

impl MockRepository {
    /// Create a new empty mock repository on branch `master`
    pub fn new() -> Self {
        MockRepository {
            commits: Vec::new(),
            tags: Vec::new(),
            branch: Some("master".to_string()),
            detached: false,
            created_commits: Mutex::new(Vec::new()),
            created_tags: Mutex::new(Vec::new()),
            pushed_tags: Mutex::new(Vec::new()),
        }
    }

    /// Append a commit on top of the current history
    pub fn add_commit(&mut self, record: CommitRecord) {
        self.commits.push(record);
    }

    /// Tag the commit with the given hash
    pub fn add_tag(&mut self, tag: GitTag, hash: impl Into<String>) {
        self.tags.push((tag, hash.into()));
    }

    /// Set the checked out branch; `None` detaches `HEAD`
    pub fn set_branch(&mut self, branch: Option<&str>) {
        self.detached = branch.is_none();
        self.branch = branch.map(str::to_string);
    }

    /// `(header, body, footer)` of every commit made through the trait
    pub fn created_commits(&self) -> Vec<(String, String, String)> {
        self.created_commits
            .lock()
            .map(|commits| commits.clone())
            .unwrap_or_default()
    }

    /// `(name, message)` of every tag created through the trait
    pub fn created_tags(&self) -> Vec<(String, String)> {
        self.created_tags
            .lock()
            .map(|tags| tags.clone())
            .unwrap_or_default()
    }

    /// `(remote, tag)` of every pushed tag
    pub fn pushed_tags(&self) -> Vec<(String, String)> {
        self.pushed_tags
            .lock()
            .map(|tags| tags.clone())
            .unwrap_or_default()
    }

    fn position(&self, revision: &str) -> Result<usize> {
        let hash = self
            .tags
            .iter()
            .find(|(tag, _)| tag.name == revision)
            .map(|(_, hash)| hash.as_str())
            .unwrap_or(revision);

        self.commits
            .iter()
            .position(|commit| commit.hash == hash)
            .ok_or_else(|| GitSvError::Git(git2::Error::from_str(&format!(
                "Cannot resolve revision '{}'",
                revision
            ))))
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn describe(&self, pattern: &str) -> Result<Option<String>> {
        let prefix = pattern.split('*').next().unwrap_or_default();
        Ok(self
            .tags
            .iter()
            .filter(|(tag, _)| tag.name.starts_with(prefix))
            .filter_map(|(tag, hash)| {
                self.commits
                    .iter()
                    .position(|commit| &commit.hash == hash)
                    .map(|position| (position, tag.name.clone()))
            })
            .max_by_key(|(position, _)| *position)
            .map(|(_, name)| name))
    }

    fn log(&self, range: &LogRange) -> Result<Vec<CommitRecord>> {
        let selected: Vec<CommitRecord> = match range.kind {
            LogRangeKind::Date => self
                .commits
                .iter()
                .filter(|commit| range.start.is_empty() || commit.date >= range.start)
                .filter(|commit| range.end.is_empty() || commit.date <= range.end)
                .cloned()
                .collect(),
            LogRangeKind::Tag | LogRangeKind::Hash => {
                let from = if range.start.is_empty() {
                    0
                } else {
                    self.position(&range.start)? + 1
                };
                let to = if range.end.is_empty() {
                    self.commits.len()
                } else {
                    self.position(&range.end)? + 1
                };
                self.commits
                    .get(from..to)
                    .map(|slice| slice.to_vec())
                    .unwrap_or_default()
            }
        };

        Ok(selected.into_iter().rev().collect())
    }

    fn tags(&self) -> Result<Vec<GitTag>> {
        let mut tags: Vec<GitTag> = self.tags.iter().map(|(tag, _)| tag.clone()).collect();
        tags.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
        Ok(tags)
    }

    fn branch(&self) -> Result<Option<String>> {
        Ok(self.branch.clone())
    }

    fn is_detached(&self) -> Result<bool> {
        Ok(self.detached)
    }

    fn commit(&self, header: &str, body: &str, footer: &str) -> Result<()> {
        if let Ok(mut commits) = self.created_commits.lock() {
            commits.push((header.to_string(), body.to_string(), footer.to_string()));
        }
        Ok(())
    }

    fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        let exists = self.tags.iter().any(|(tag, _)| tag.name == name);
        let mut created = self
            .created_tags
            .lock()
            .map_err(|_| GitSvError::tag("mock tag store poisoned"))?;
        if exists || created.iter().any(|(created, _)| created == name) {
            return Err(GitSvError::tag(format!("Tag '{}' already exists", name)));
        }
        created.push((name.to_string(), message.to_string()));
        Ok(())
    }

    fn push_tags(&self, remote: &str, tag_names: &[&str]) -> Result<()> {
        if let Ok(mut pushed) = self.pushed_tags.lock() {
            pushed.extend(
                tag_names
                    .iter()
                    .map(|tag| (remote.to_string(), tag.to_string())),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hash: &str, subject: &str, date: &str) -> CommitRecord {
        CommitRecord {
            date: date.to_string(),
            hash: hash.to_string(),
            author_name: "Author".to_string(),
            subject: subject.to_string(),
            body: String::new(),
        }
    }

    fn repo() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.add_commit(record("a1", "feat: one", "2024-01-01"));
        repo.add_commit(record("b2", "fix: two", "2024-02-01"));
        repo.add_commit(record("c3", "fix: three", "2024-03-01"));
        repo.add_tag(GitTag::new("v1.0.0", None), "a1");
        repo
    }

    #[test]
    fn test_mock_log_is_newest_first() {
        let subjects: Vec<_> = repo()
            .log(&LogRange::default())
            .unwrap()
            .into_iter()
            .map(|c| c.subject)
            .collect();
        assert_eq!(subjects, vec!["fix: three", "fix: two", "feat: one"]);
    }

    #[test]
    fn test_mock_log_tag_range() {
        let repo = repo();
        assert_eq!(repo.log(&LogRange::tag("v1.0.0", "")).unwrap().len(), 2);
        assert_eq!(repo.log(&LogRange::tag("", "v1.0.0")).unwrap().len(), 1);
        assert!(repo.log(&LogRange::tag("v9", "")).is_err());
    }

    #[test]
    fn test_mock_log_date_range() {
        let range = LogRange::new(LogRangeKind::Date, "2024-02-01", "2024-02-01");
        let commits = repo().log(&range).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].hash, "b2");
    }

    #[test]
    fn test_mock_describe() {
        let repo = repo();
        assert_eq!(repo.describe("v*").unwrap().as_deref(), Some("v1.0.0"));
        assert_eq!(repo.describe("release-*").unwrap(), None);
    }

    #[test]
    fn test_mock_records_writes() {
        let repo = repo();
        repo.commit("feat: x", "", "").unwrap();
        repo.create_tag("v1.1.0", "Version 1.1.0").unwrap();
        repo.push_tags("origin", &["v1.1.0"]).unwrap();
        assert!(repo.create_tag("v1.0.0", "again").is_err());

        assert_eq!(repo.created_commits().len(), 1);
        assert_eq!(repo.created_tags()[0].0, "v1.1.0");
        assert_eq!(
            repo.pushed_tags(),
            vec![("origin".to_string(), "v1.1.0".to_string())]
        );
    }

    #[test]
    fn test_mock_detached_branch() {
        let mut repo = MockRepository::default();
        repo.set_branch(None);
        assert!(repo.is_detached().unwrap());
        assert_eq!(repo.branch().unwrap(), None);
    }
}
