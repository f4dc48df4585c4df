use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use git2::{
    DescribeFormatOptions, DescribeOptions, ErrorCode, ObjectType, Oid, Repository as Git2Repo,
    Sort,
};
use std::path::Path;

use crate::domain::GitTag;
use crate::error::{GitSvError, Result};
use crate::git::{CommitRecord, LogRange, LogRangeKind};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Working directory root, `None` for bare repositories
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    fn head_is_unborn(&self) -> bool {
        matches!(self.repo.head(), Err(e) if e.code() == ErrorCode::UnbornBranch)
    }

    fn resolve_commit(&self, revision: &str) -> Result<Oid> {
        let object = self.repo.revparse_single(revision).map_err(|e| {
            GitSvError::Git(git2::Error::from_str(&format!(
                "Cannot resolve revision '{}': {}",
                revision,
                e.message()
            )))
        })?;
        Ok(object.peel_to_commit()?.id())
    }

    fn record(&self, commit: &git2::Commit) -> Result<CommitRecord> {
        let short_id = commit.as_object().short_id()?;
        let author = commit.author();

        Ok(CommitRecord {
            date: local_date(author.when())
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            hash: short_id.as_str().unwrap_or_default().to_string(),
            author_name: author.name().unwrap_or("unknown").to_string(),
            subject: commit.summary().unwrap_or_default().to_string(),
            body: commit.body().unwrap_or_default().trim_end().to_string(),
        })
    }

    fn tag_time(&self, name: &str) -> Result<Option<DateTime<Utc>>> {
        let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;

        if let Some(tag) = reference.target().and_then(|oid| self.repo.find_tag(oid).ok()) {
            if let Some(tagger) = tag.tagger() {
                return Ok(utc_time(tagger.when()));
            }
        }

        Ok(reference
            .peel_to_commit()
            .ok()
            .and_then(|commit| utc_time(commit.time())))
    }
}

fn utc_time(time: git2::Time) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.seconds(), 0)
}

/// Calendar date of `time` in the offset it was recorded with
fn local_date(time: git2::Time) -> Option<NaiveDate> {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60)?;
    utc_time(time).map(|utc| utc.with_timezone(&offset).date_naive())
}

fn parse_date(value: &str) -> Result<Option<NaiveDate>> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| GitSvError::config(format!("invalid date '{}': {}", value, e)))
}

impl super::Repository for Git2Repository {
    fn describe(&self, pattern: &str) -> Result<Option<String>> {
        let mut options = DescribeOptions::new();
        options.describe_tags().pattern(pattern);

        match self.repo.describe(&options) {
            Ok(describe) => {
                let mut format = DescribeFormatOptions::new();
                format.abbreviated_size(0);
                Ok(Some(describe.format(Some(&format))?))
            }
            Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::UnbornBranch) => {
                tracing::debug!("no tag matching '{}' is reachable from HEAD", pattern);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn log(&self, range: &LogRange) -> Result<Vec<CommitRecord>> {
        if self.head_is_unborn() {
            return Ok(Vec::new());
        }

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        let mut since = None;
        let mut until = None;
        match range.kind {
            LogRangeKind::Date => {
                revwalk.push_head()?;
                since = parse_date(&range.start)?;
                until = parse_date(&range.end)?;
            }
            LogRangeKind::Tag | LogRangeKind::Hash => {
                if range.end.is_empty() {
                    revwalk.push_head()?;
                } else {
                    revwalk.push(self.resolve_commit(&range.end)?)?;
                }
                if !range.start.is_empty() {
                    revwalk.hide(self.resolve_commit(&range.start)?)?;
                }
            }
        }
        tracing::debug!(
            "reading log {:?} '{}'..'{}'",
            range.kind,
            range.start,
            range.end
        );

        let mut records = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;

            if since.is_some() || until.is_some() {
                let Some(date) = local_date(commit.time()) else {
                    continue;
                };
                if since.is_some_and(|since| date < since) || until.is_some_and(|until| date > until)
                {
                    continue;
                }
            }

            records.push(self.record(&commit)?);
        }

        Ok(records)
    }

    fn tags(&self) -> Result<Vec<GitTag>> {
        let names = self.repo.tag_names(None)?;

        let mut tags = Vec::new();
        for name in names.iter().flatten() {
            tags.push(GitTag::new(name, self.tag_time(name)?));
        }
        tags.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));

        Ok(tags)
    }

    fn branch(&self) -> Result<Option<String>> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().map(str::to_string)),
            Ok(_) => Ok(None),
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head = self.repo.find_reference("HEAD")?;
                Ok(head
                    .symbolic_target()
                    .map(|target| target.trim_start_matches("refs/heads/").to_string()))
            }
            Err(e) => Err(GitSvError::branch(format!("Cannot read HEAD: {}", e))),
        }
    }

    fn is_detached(&self) -> Result<bool> {
        Ok(self.repo.head_detached()?)
    }

    fn commit(&self, header: &str, body: &str, footer: &str) -> Result<()> {
        let signature = self.repo.signature()?;
        let mut index = self.repo.index()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };
        if parent.as_ref().is_some_and(|p| p.tree_id() == tree.id()) {
            return Err(GitSvError::Git(git2::Error::from_str(
                "nothing to commit, stage changes first",
            )));
        }

        let message = [header, body, footer]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &format!("{}\n", message),
            &tree,
            &parents,
        )?;
        tracing::debug!("created commit {}", oid);

        Ok(())
    }

    fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        let target = self
            .repo
            .head()?
            .peel(ObjectType::Commit)
            .map_err(|e| GitSvError::tag(format!("Cannot find HEAD commit: {}", e)))?;
        let signature = self.repo.signature()?;

        self.repo
            .tag(name, &target, &signature, message, false)
            .map_err(|e| GitSvError::tag(format!("Cannot create tag '{}': {}", name, e)))?;
        tracing::debug!("created tag {} at {}", name, target.id());

        Ok(())
    }

    fn push_tags(&self, remote: &str, tag_names: &[&str]) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote)
            .map_err(|e| GitSvError::remote(format!("Cannot find remote: {}", e)))?;
        let git_config = self.repo.config()?;

        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|url, username_from_url, allowed_types| {
            let username = username_from_url.unwrap_or("git");

            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
                let keys = ["id_ed25519", "id_rsa", "id_ecdsa"];
                let ssh_dir = dirs::home_dir().map(|home| home.join(".ssh"));
                for key in keys.iter().filter_map(|key| ssh_dir.as_ref().map(|d| d.join(key))) {
                    if key.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &key, None) {
                            return Ok(cred);
                        }
                    }
                }
            }

            if allowed_types.contains(git2::CredentialType::USER_PASS_PLAINTEXT) {
                if let Ok(cred) = git2::Cred::credential_helper(&git_config, url, username_from_url)
                {
                    return Ok(cred);
                }
            }

            git2::Cred::default()
        });

        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => {
                tracing::warn!("could not update reference {}: {}", refname, status);
                Err(git2::Error::from_str(&format!("Push failed for {}", refname)))
            }
            None => Ok(()),
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspecs: Vec<String> = tag_names
            .iter()
            .map(|tag| format!("refs/tags/{}:refs/tags/{}", tag, tag))
            .collect();
        let refspec_strs: Vec<&str> = refspecs.iter().map(|s| s.as_str()).collect();

        remote
            .push(&refspec_strs, Some(&mut push_options))
            .map_err(|e| match e.class() {
                git2::ErrorClass::Net => {
                    GitSvError::remote(format!("Network error during push: {}", e))
                }
                _ => GitSvError::remote(format!("Push failed: {}", e)),
            })?;
        tracing::debug!("pushed {} tag(s)", tag_names.len());

        Ok(())
    }
}

// SAFETY: git2::Repository is Send; the CLI drives it from a single thread
// and never hands out references across threads.
unsafe impl Sync for Git2Repository {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Repository;
    use std::fs;
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, Git2Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Git2Repo::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
        (dir, Git2Repository::from_git2(repo))
    }

    fn stage(dir: &TempDir, repo: &Git2Repository, file: &str, content: &str) {
        fs::write(dir.path().join(file), content).unwrap();
        let mut index = repo.repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
    }

    #[test]
    fn test_empty_repository() {
        let (_dir, repo) = init_repo();
        assert!(repo.log(&LogRange::default()).unwrap().is_empty());
        assert!(repo.tags().unwrap().is_empty());
        assert_eq!(repo.describe("*").unwrap(), None);
        assert!(!repo.is_detached().unwrap());
    }

    #[test]
    fn test_commit_and_log() {
        let (dir, repo) = init_repo();
        stage(&dir, &repo, "a.txt", "a");
        repo.commit("feat: first", "body text", "jira: ABC-1").unwrap();

        let records = repo.log(&LogRange::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].subject, "feat: first");
        assert_eq!(records[0].body, "body text\n\njira: ABC-1");
        assert_eq!(records[0].author_name, "Test User");
        assert_eq!(records[0].date.len(), 10);
    }

    #[test]
    fn test_commit_without_changes_fails() {
        let (dir, repo) = init_repo();
        stage(&dir, &repo, "a.txt", "a");
        repo.commit("feat: first", "", "").unwrap();
        assert!(repo.commit("feat: again", "", "").is_err());
    }

    #[test]
    fn test_tag_range() {
        let (dir, repo) = init_repo();
        stage(&dir, &repo, "a.txt", "a");
        repo.commit("feat: first", "", "").unwrap();
        repo.create_tag("v1.0.0", "Version 1.0.0").unwrap();
        stage(&dir, &repo, "b.txt", "b");
        repo.commit("fix: second", "", "").unwrap();

        assert_eq!(repo.describe("v*").unwrap().as_deref(), Some("v1.0.0"));
        assert_eq!(repo.describe("release-*").unwrap(), None);

        let since_tag = repo.log(&LogRange::tag("v1.0.0", "")).unwrap();
        assert_eq!(since_tag.len(), 1);
        assert_eq!(since_tag[0].subject, "fix: second");

        let up_to_tag = repo.log(&LogRange::tag("", "v1.0.0")).unwrap();
        assert_eq!(up_to_tag.len(), 1);
        assert_eq!(up_to_tag[0].subject, "feat: first");

        let tags = repo.tags().unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "v1.0.0");
        assert!(tags[0].date.is_some());
    }

    #[test]
    fn test_unknown_revision_is_error() {
        let (dir, repo) = init_repo();
        stage(&dir, &repo, "a.txt", "a");
        repo.commit("feat: first", "", "").unwrap();
        assert!(repo.log(&LogRange::tag("v9.9.9", "")).is_err());
    }

    #[test]
    fn test_branch_names() {
        let (dir, repo) = init_repo();
        let unborn = repo.branch().unwrap();
        assert!(unborn.is_some());

        stage(&dir, &repo, "a.txt", "a");
        repo.commit("feat: first", "", "").unwrap();
        assert_eq!(repo.branch().unwrap(), unborn);

        let head = repo.repo.head().unwrap().target().unwrap();
        repo.repo.set_head_detached(head).unwrap();
        assert!(repo.is_detached().unwrap());
        assert_eq!(repo.branch().unwrap(), None);
    }

    #[test]
    fn test_date_range_filters_by_day() {
        let (dir, repo) = init_repo();
        stage(&dir, &repo, "a.txt", "a");
        repo.commit("feat: first", "", "").unwrap();

        let all = repo
            .log(&LogRange::new(LogRangeKind::Date, "2000-01-01", ""))
            .unwrap();
        assert_eq!(all.len(), 1);

        let none = repo
            .log(&LogRange::new(LogRangeKind::Date, "", "2000-01-01"))
            .unwrap();
        assert!(none.is_empty());

        assert!(repo
            .log(&LogRange::new(LogRangeKind::Date, "yesterday", ""))
            .is_err());
    }
}
