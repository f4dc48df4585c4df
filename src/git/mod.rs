//! Git operations abstraction layer
//!
//! The [Repository] trait lists what git-sv needs from git. Two
//! implementations exist:
//!
//! - [repository::Git2Repository]: backed by the `git2` crate
//! - [mock::MockRepository]: in memory, for workflow tests
//!
//! Commands depend on the trait so they can be exercised without a real
//! repository.
//!
//! ```rust
//! # use git_sv::git::{LogRange, Repository};
//! # fn example<R: Repository>(repo: &R) -> Result<(), Box<dyn std::error::Error>> {
//! let since_last_tag = match repo.describe("*")? {
//!     Some(tag) => LogRange::tag(tag, ""),
//!     None => LogRange::default(),
//! };
//! for record in repo.log(&since_last_tag)? {
//!     println!("{} {}", record.hash, record.subject);
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use clap::ValueEnum;

use crate::domain::GitTag;
use crate::error::Result;

/// A commit as read from the log, before message parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Author date formatted as `YYYY-MM-DD`
    pub date: String,
    /// Abbreviated commit id
    pub hash: String,
    pub author_name: String,
    pub subject: String,
    pub body: String,
}

/// How the bounds of a [LogRange] are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogRangeKind {
    /// Bounds are tag names
    #[default]
    Tag,
    /// Bounds are `YYYY-MM-DD` dates, both inclusive
    Date,
    /// Bounds are commit ids or any other revision
    Hash,
}

/// Commits to read from the log.
///
/// For tag and hash ranges `start` is exclusive and `end` inclusive, like
/// `git log start..end`. An empty `start` reads from the root and an empty
/// `end` means `HEAD`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogRange {
    pub kind: LogRangeKind,
    pub start: String,
    pub end: String,
}

impl LogRange {
    pub fn new(kind: LogRangeKind, start: impl Into<String>, end: impl Into<String>) -> Self {
        LogRange {
            kind,
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn tag(start: impl Into<String>, end: impl Into<String>) -> Self {
        LogRange::new(LogRangeKind::Tag, start, end)
    }
}

/// Common git operation trait for abstraction
///
/// All implementors must be `Send + Sync`. Methods return
/// [crate::error::Result] and map `git2` failures onto
/// [crate::error::GitSvError] variants.
pub trait Repository: Send + Sync {
    /// Latest tag reachable from `HEAD` whose name matches a glob
    ///
    /// # Arguments
    /// * `pattern` - Glob the tag name must match (e.g. "v*")
    ///
    /// # Returns
    /// * `Ok(Some(name))` - Closest matching tag
    /// * `Ok(None)` - No matching tag is reachable
    /// * `Err` - If there's a Git error
    fn describe(&self, pattern: &str) -> Result<Option<String>>;

    /// Commits in `range`, newest first
    ///
    /// # Arguments
    /// * `range` - Bounds of the log, see [LogRange]
    ///
    /// # Returns
    /// * `Ok(Vec<CommitRecord>)` - Commits in git-log order
    /// * `Err` - If a bound cannot be resolved or there's a Git error
    fn log(&self, range: &LogRange) -> Result<Vec<CommitRecord>>;

    /// All tags with their dates, oldest first
    fn tags(&self) -> Result<Vec<GitTag>>;

    /// Name of the checked out branch, `None` when `HEAD` is detached
    fn branch(&self) -> Result<Option<String>>;

    /// Whether `HEAD` points directly at a commit
    fn is_detached(&self) -> Result<bool>;

    /// Commit the staged changes
    ///
    /// # Arguments
    /// * `header` - First line of the message
    /// * `body` - Free text, may be empty
    /// * `footer` - Footer lines, may be empty
    ///
    /// Non-empty parts are separated by blank lines.
    fn commit(&self, header: &str, body: &str, footer: &str) -> Result<()>;

    /// Create an annotated tag at `HEAD`
    ///
    /// # Returns
    /// * `Ok(())` - Success
    /// * `Err` - If the tag already exists or there's a Git error
    fn create_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Push tags to a remote
    ///
    /// # Arguments
    /// * `remote` - Name of the remote (e.g., "origin")
    /// * `tag_names` - Tags to push
    fn push_tags(&self, remote: &str, tag_names: &[&str]) -> Result<()>;
}
