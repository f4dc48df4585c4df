//! Command-line arguments and command workflows

pub mod orchestration;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::git::LogRangeKind;

pub use orchestration::Workflow;

#[derive(Parser, Debug)]
#[command(
    name = "git-sv",
    version,
    about = "Semantic versioning tool for git based on conventional commits"
)]
pub struct Cli {
    #[arg(
        short,
        long,
        global = true,
        help = "Custom configuration file path, replaces user and repository configuration"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Cli configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Get last released version from git
    #[command(visible_alias = "cv")]
    CurrentVersion,

    /// Generate the next version based on git commit messages
    #[command(visible_alias = "nv")]
    NextVersion,

    /// List all commit logs according to range as json
    #[command(visible_alias = "cl")]
    CommitLog(CommitLogArgs),

    /// Generate a commit notes according to range
    #[command(visible_alias = "cn")]
    CommitNotes(RangeArgs),

    /// Generate release notes
    #[command(visible_alias = "rn")]
    ReleaseNotes(ReleaseNotesArgs),

    /// Generate changelog
    #[command(visible_alias = "cgl")]
    Changelog(ChangelogArgs),

    /// Generate tag with version based on git commit messages
    #[command(visible_alias = "tg")]
    Tag(TagArgs),

    /// Execute git commit with conventional commit message helper
    #[command(visible_alias = "cmt")]
    Commit(CommitArgs),

    /// Use as prepare-commit-message hook to validate and enhance the message
    #[command(visible_alias = "vcm")]
    ValidateCommitMessage(ValidateArgs),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show default config
    Default,
    /// Show current config
    Show,
}

#[derive(Args, Debug, Default)]
pub struct RangeArgs {
    #[arg(short, long, value_enum, default_value_t = LogRangeKind::Tag, help = "Type of range of commits")]
    pub range: LogRangeKind,

    #[arg(short, long, help = "Start range of git log revision range, exclusive")]
    pub start: Option<String>,

    #[arg(short, long, help = "End range of git log revision range, inclusive")]
    pub end: Option<String>,
}

#[derive(Args, Debug)]
pub struct CommitLogArgs {
    #[arg(
        short,
        long,
        conflicts_with_all = ["range", "start", "end"],
        help = "Get commit log from a specific tag"
    )]
    pub tag: Option<String>,

    #[command(flatten)]
    pub bounds: RangeArgs,
}

#[derive(Args, Debug)]
pub struct ReleaseNotesArgs {
    #[arg(short, long, help = "Get release note from tag")]
    pub tag: Option<String>,
}

#[derive(Args, Debug)]
pub struct ChangelogArgs {
    #[arg(short, long, default_value_t = 10, help = "Get changelog from last 'n' tags")]
    pub size: usize,

    #[arg(short, long, help = "Ignore size parameter, get changelog for every tag")]
    pub all: bool,

    #[arg(long, help = "Add next version on change log (commits since last tag)")]
    pub add_next_version: bool,

    #[arg(long, help = "Only include tags matching the tag pattern with a valid version")]
    pub semantic_version_only: bool,
}

#[derive(Args, Debug)]
pub struct TagArgs {
    #[arg(short, long, default_value = "origin", help = "Remote to push the tag to")]
    pub remote: String,

    #[arg(long, help = "Create the tag locally without pushing it")]
    pub no_push: bool,
}

#[derive(Args, Debug, Default)]
pub struct CommitArgs {
    #[arg(short = 't', long = "type", help = "Commit type, prompted when missing")]
    pub commit_type: Option<String>,

    #[arg(short, long, help = "Commit scope")]
    pub scope: Option<String>,

    #[arg(short, long, help = "Commit description, prompted when missing")]
    pub description: Option<String>,

    #[arg(short, long, help = "Commit body")]
    pub body: Option<String>,

    #[arg(short, long, help = "Issue id, defaults to the one found in the branch name")]
    pub issue: Option<String>,

    #[arg(long, help = "Breaking change description")]
    pub breaking_change: Option<String>,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[arg(short, long, default_value = ".git", help = "Git repository path")]
    pub path: PathBuf,

    #[arg(
        short,
        long,
        default_value = "COMMIT_EDITMSG",
        help = "Name of the file that contains the commit log message"
    )]
    pub file: String,

    #[arg(
        long,
        default_value = "message",
        help = "Source of the commit message (message, template, merge, squash, commit)"
    )]
    pub source: String,
}
