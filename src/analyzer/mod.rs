//! Derivation engines over parsed commits: version bumps and release notes

pub mod release_notes;
pub mod version_analyzer;

pub use release_notes::ReleaseNoteProcessor;
pub use version_analyzer::VersionAnalyzer;
