//! Domain logic - pure value types independent of git operations

pub mod commit;
pub mod message;
pub mod release_note;
pub mod tag;
pub mod version;

pub use commit::{GitCommitLog, GitTag};
pub use message::{
    CommitMessage, BREAKING_CHANGE_FOOTER_KEY, BREAKING_CHANGE_METADATA_KEY, ISSUE_METADATA_KEY,
};
pub use release_note::{BreakingChangeSection, CommitsSection, ReleaseNote, ReleaseNoteSection};
pub use tag::TagPattern;
pub use version::{bump_version, core_version, to_version, VersionBump};
