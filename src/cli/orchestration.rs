//! Command workflows
//!
//! Each subcommand is a method on [Workflow], which ties resolved
//! configuration to a [Repository]. Workflows return values and notices;
//! printing is left to the binary so every command can run against
//! [crate::git::MockRepository] in tests.

use chrono::{DateTime, NaiveDate, Utc};
use semver::Version;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use crate::analyzer::{ReleaseNoteProcessor, VersionAnalyzer};
use crate::config::Config;
use crate::conventional::MessageProcessor;
use crate::domain::{
    core_version, to_version, CommitMessage, GitCommitLog, GitTag, ReleaseNote, TagPattern,
};
use crate::error::{GitSvError, Result};
use crate::git::{LogRange, LogRangeKind, Repository};
use crate::notice::Notice;

/// Message source for which validation never applies
const MERGE_SOURCE: &str = "merge";

/// A version released through a tag
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    pub tag: String,
    pub version: Version,
}

/// Result of the next version computation
#[derive(Debug, Clone, PartialEq)]
pub struct NextVersion {
    /// Latest release, `None` when no tag exists yet
    pub latest: Option<Release>,
    /// Version the next one is computed from, `0.0.0` without a release
    pub current: Version,
    pub next: Version,
    /// Whether any commit since the latest release warrants a new version
    pub updated: bool,
    /// Parsed commits since the latest release, newest first
    pub commits: Vec<GitCommitLog>,
}

/// Options of the changelog command
#[derive(Debug, Clone, PartialEq)]
pub struct ChangelogOptions {
    pub size: usize,
    pub all: bool,
    pub add_next_version: bool,
    pub semantic_version_only: bool,
}

impl Default for ChangelogOptions {
    fn default() -> Self {
        ChangelogOptions {
            size: 10,
            all: false,
            add_next_version: false,
            semantic_version_only: false,
        }
    }
}

/// Release notes making up a changelog, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct Changelog {
    pub notes: Vec<ReleaseNote>,
    pub notices: Vec<Notice>,
}

/// Result of the tag command
#[derive(Debug, Clone, PartialEq)]
pub enum TagOutcome {
    Created {
        tag: String,
        version: Version,
        pushed: bool,
    },
    /// Nothing since the latest release warrants a new version
    Skipped(Notice),
}

/// Parts of a commit to create; missing parts have been prompted already
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommitRequest {
    pub commit_type: String,
    pub scope: String,
    pub description: String,
    pub body: String,
    /// `None` uses the issue id found in the branch name
    pub issue: Option<String>,
    pub breaking_change: String,
}

/// Result of the commit message hook
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Skipped(Notice),
    Valid {
        /// Footer appended to the message file
        appended: Option<String>,
        notice: Option<Notice>,
    },
}

/// Configuration bound to a repository
pub struct Workflow<'r, R: Repository> {
    repo: &'r R,
    config: Config,
    messages: MessageProcessor,
    versions: VersionAnalyzer,
    release_notes: ReleaseNoteProcessor,
    tag_pattern: TagPattern,
}

impl<'r, R: Repository> Workflow<'r, R> {
    /// Build the processors once from resolved configuration
    ///
    /// # Returns
    /// * `Ok(Workflow)` - Ready to run commands
    /// * `Err` - If the configuration holds an invalid regex, tag pattern or section layout
    pub fn new(repo: &'r R, config: Config) -> Result<Self> {
        let messages =
            MessageProcessor::new(config.commit_message.clone(), config.branches.clone())?;
        let versions = VersionAnalyzer::new(&config.versioning, &config.commit_message);
        let release_notes = ReleaseNoteProcessor::new(config.release_notes.clone())?;
        let tag_pattern = TagPattern::new(config.tag.pattern.as_str())?;

        Ok(Workflow {
            repo,
            config,
            messages,
            versions,
            release_notes,
            tag_pattern,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn messages(&self) -> &MessageProcessor {
        &self.messages
    }

    /// Read and parse the commits in `range`, newest first
    pub fn commits(&self, range: &LogRange) -> Result<Vec<GitCommitLog>> {
        let records = self.repo.log(range)?;
        tracing::debug!("parsing {} commit(s)", records.len());

        Ok(records
            .into_iter()
            .map(|record| {
                let message = self.messages.parse(&record.subject, &record.body);
                GitCommitLog::new(record.date, record.hash, record.author_name, message)
            })
            .collect())
    }

    /// Version carried by a tag name according to the tag pattern
    pub fn tag_version(&self, tag: &str) -> Result<Version> {
        let version = self.tag_pattern.version_part(tag).ok_or_else(|| {
            GitSvError::version(format!(
                "tag '{}' does not match pattern '{}'",
                tag,
                self.tag_pattern.as_str()
            ))
        })?;
        to_version(version)
    }

    /// Tag name for a version according to the tag pattern
    pub fn tag_name(&self, version: &Version) -> String {
        self.tag_pattern.format(&core_version(version))
    }

    fn latest_tag(&self) -> Result<Option<String>> {
        self.repo.describe(&self.tag_pattern.format("*"))
    }

    /// Latest release reachable from `HEAD`
    pub fn latest_release(&self) -> Result<Option<Release>> {
        let Some(tag) = self.latest_tag()? else {
            return Ok(None);
        };
        let version = self.tag_version(&tag)?;
        Ok(Some(Release { tag, version }))
    }

    /// Latest released version, `0.0.0` when nothing was released yet
    pub fn current_version(&self) -> Result<Version> {
        Ok(self
            .latest_release()?
            .map(|release| release.version)
            .unwrap_or_else(|| Version::new(0, 0, 0)))
    }

    /// Version following the latest release.
    ///
    /// Without any release the computation starts from `0.0.0`.
    pub fn next_version(&self) -> Result<NextVersion> {
        let latest = self.latest_release()?;
        let start = latest
            .as_ref()
            .map(|release| release.tag.clone())
            .unwrap_or_default();
        let commits = self.commits(&LogRange::tag(start, ""))?;

        let current = latest
            .as_ref()
            .map(|release| release.version.clone())
            .unwrap_or_else(|| Version::new(0, 0, 0));
        let (next, updated) = self.versions.next_version(Some(&current), &commits)?;
        tracing::debug!("next version {:?}, updated: {}", next, updated);

        Ok(NextVersion {
            next: next.unwrap_or_else(|| current.clone()),
            latest,
            current,
            updated,
            commits,
        })
    }

    /// Log range from command-line bounds.
    ///
    /// A tag range without start begins at the latest release.
    pub fn resolve_range(
        &self,
        kind: LogRangeKind,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<LogRange> {
        let start = match (kind, start) {
            (_, Some(start)) => start.to_string(),
            (LogRangeKind::Tag, None) => self.latest_tag()?.unwrap_or_default(),
            (_, None) => String::new(),
        };
        Ok(LogRange::new(kind, start, end.unwrap_or_default()))
    }

    /// The tag and the one created before it, empty if it is the first
    fn tag_bounds(&self, tag: &str) -> Result<(String, GitTag)> {
        let tags = self.repo.tags()?;
        let index = tags
            .iter()
            .position(|candidate| candidate.name == tag)
            .ok_or_else(|| GitSvError::tag(format!("tag: {} not found", tag)))?;

        let previous = match index {
            0 => String::new(),
            _ => tags[index - 1].name.clone(),
        };
        Ok((previous, tags[index].clone()))
    }

    /// Commits introduced by a tag, since the tag before it
    pub fn tag_commits(&self, tag: &str) -> Result<Vec<GitCommitLog>> {
        let (previous, _) = self.tag_bounds(tag)?;
        self.commits(&LogRange::tag(previous, tag))
    }

    /// Commits for the commit-log command
    pub fn commit_log(&self, tag: Option<&str>, range: &LogRange) -> Result<Vec<GitCommitLog>> {
        match tag {
            Some(tag) => self.tag_commits(tag),
            None => self.commits(range),
        }
    }

    /// Release note without version for an arbitrary range, dated by its newest commit
    pub fn commit_notes(&self, range: &LogRange) -> Result<ReleaseNote> {
        let commits = self.commits(range)?;
        let date = commits.first().and_then(|commit| day_start(&commit.date));
        Ok(self.release_notes.create(None, "", date, &commits))
    }

    /// Release note of a past tag, or of the next version when `tag` is `None`
    pub fn release_note(&self, tag: Option<&str>) -> Result<ReleaseNote> {
        match tag {
            Some(tag) => {
                let version = self.tag_version(tag)?;
                let (previous, current) = self.tag_bounds(tag)?;
                let commits = self.commits(&LogRange::tag(previous, tag))?;
                Ok(self
                    .release_notes
                    .create(Some(version), tag, current.date, &commits))
            }
            None => {
                let next = self.next_version()?;
                let tag = self.tag_name(&next.next);
                Ok(self.release_notes.create(
                    Some(next.next),
                    &tag,
                    Some(Utc::now()),
                    &next.commits,
                ))
            }
        }
    }

    /// Release notes for the latest tags, newest first
    pub fn changelog(&self, options: &ChangelogOptions) -> Result<Changelog> {
        let mut notices = Vec::new();
        let mut tags = Vec::new();
        for tag in self.repo.tags()?.into_iter().rev() {
            match self.tag_version(&tag.name) {
                Ok(version) => tags.push((tag, Some(version))),
                Err(e) if options.semantic_version_only => {
                    tracing::debug!("skipping tag {}: {}", tag.name, e);
                }
                Err(e) => {
                    notices.push(Notice::UnparsableTag {
                        tag: tag.name.clone(),
                        reason: e.to_string(),
                    });
                    tags.push((tag, None));
                }
            }
        }

        let mut notes = Vec::new();
        if options.add_next_version {
            let next = self.next_version()?;
            if next.updated {
                let tag = self.tag_name(&next.next);
                notes.push(self.release_notes.create(
                    Some(next.next),
                    &tag,
                    Some(Utc::now()),
                    &next.commits,
                ));
            }
        }

        let limit = if options.all { tags.len() } else { options.size };
        for (index, (tag, version)) in tags.iter().enumerate().take(limit) {
            let previous = tags
                .get(index + 1)
                .map(|(previous, _)| previous.name.clone())
                .unwrap_or_default();
            let commits = self.commits(&LogRange::tag(previous, tag.name.as_str()))?;
            notes.push(
                self.release_notes
                    .create(version.clone(), &tag.name, tag.date, &commits),
            );
        }

        Ok(Changelog { notes, notices })
    }

    /// Create the tag of the next version and optionally push it
    ///
    /// # Arguments
    /// * `remote` - Remote to push to
    /// * `push` - Whether to push after creating the tag
    pub fn tag(&self, remote: &str, push: bool) -> Result<TagOutcome> {
        let next = self.next_version()?;
        if !next.updated {
            return Ok(TagOutcome::Skipped(Notice::NothingToRelease {
                current: core_version(&next.current),
            }));
        }

        let tag = self.tag_name(&next.next);
        let message = format!("Version {}", core_version(&next.next));
        self.repo.create_tag(&tag, &message)?;
        if push {
            self.repo.push_tags(remote, &[tag.as_str()])?;
        }

        Ok(TagOutcome::Created {
            tag,
            version: next.next,
            pushed: push,
        })
    }

    /// Issue id found in the current branch name, empty if none
    pub fn branch_issue(&self) -> Result<String> {
        let branch = self.repo.branch()?.unwrap_or_default();
        self.messages.issue_id(&branch)
    }

    /// Format, validate and commit a message
    ///
    /// # Returns
    /// * `Ok((header, body, footer))` - The committed message parts
    /// * `Err` - If the header is not a valid conventional commit or git fails
    pub fn commit(&self, request: &CommitRequest) -> Result<(String, String, String)> {
        let issue = match &request.issue {
            Some(issue) => issue.clone(),
            None => self.branch_issue()?,
        };
        let message = CommitMessage::new(
            request.commit_type.as_str(),
            request.scope.as_str(),
            request.description.as_str(),
            request.body.as_str(),
            issue,
            request.breaking_change.as_str(),
        );

        let (header, body, footer) = self.messages.format(&message);
        self.messages.validate(&header)?;
        self.repo.commit(&header, &body, &footer)?;

        Ok((header, body, footer))
    }

    /// Validate a commit message file and append the issue footer.
    ///
    /// Skipped branches and merge messages are not checked. Failing to
    /// derive the issue footer is reported as a notice.
    pub fn validate_commit_message(
        &self,
        path: &std::path::Path,
        file: &str,
        source: &str,
    ) -> Result<ValidationOutcome> {
        let branch = self.repo.branch()?.unwrap_or_default();
        let detached = self.repo.is_detached().unwrap_or_else(|e| {
            tracing::warn!("could not check for detached HEAD: {}", e);
            false
        });

        if self.messages.skip_branch(&branch, detached) {
            return Ok(ValidationOutcome::Skipped(Notice::SkippedBranch {
                branch,
                detached,
            }));
        }
        if source == MERGE_SOURCE {
            return Ok(ValidationOutcome::Skipped(Notice::SkippedSource {
                source: source.to_string(),
            }));
        }

        let file: PathBuf = path.join(file);
        let content = fs::read_to_string(&file)?;
        self.messages.validate(&content)?;

        match self.messages.enhance(&branch, &content) {
            Ok(Some(footer)) => {
                let mut handle = OpenOptions::new().append(true).open(&file)?;
                handle.write_all(footer.as_bytes())?;
                tracing::debug!("appended issue footer to {}", file.display());
                Ok(ValidationOutcome::Valid {
                    appended: Some(footer),
                    notice: None,
                })
            }
            Ok(None) => Ok(ValidationOutcome::Valid {
                appended: None,
                notice: None,
            }),
            Err(e) => Ok(ValidationOutcome::Valid {
                appended: None,
                notice: Some(Notice::EnhanceFailed {
                    reason: e.to_string(),
                }),
            }),
        }
    }
}

/// Midnight UTC of a `YYYY-MM-DD` date
fn day_start(date: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|time| time.and_utc())
}
