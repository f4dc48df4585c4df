use std::fmt;

/// Non-fatal conditions met while running a command.
/// They are reported to the user but never change the exit status.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Commit message checks are disabled for this branch
    SkippedBranch { branch: String, detached: bool },
    /// Commit message checks do not apply to this message source
    SkippedSource { source: String },
    /// The issue footer could not be added to a valid message
    EnhanceFailed { reason: String },
    /// A tag does not carry a version matching the tag pattern
    UnparsableTag { tag: String, reason: String },
    /// No commit since the latest release warrants a new version
    NothingToRelease { current: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SkippedBranch { branch, detached } => {
                if *detached {
                    write!(f, "commit message validation skipped, HEAD is detached")
                } else {
                    write!(
                        f,
                        "commit message validation skipped, branch '{}' is in the ignore list",
                        branch
                    )
                }
            }
            Notice::SkippedSource { source } => {
                write!(
                    f,
                    "commit message validation skipped, ignoring source: {}",
                    source
                )
            }
            Notice::EnhanceFailed { reason } => {
                write!(f, "could not enhance commit message, {}", reason)
            }
            Notice::UnparsableTag { tag, reason } => {
                write!(f, "Cannot parse tag '{}': {}", tag, reason)
            }
            Notice::NothingToRelease { current } => {
                write!(f, "No changes since version {}, nothing to tag", current)
            }
        }
    }
}
