use thiserror::Error;

/// Unified error type for git-sv operations
#[derive(Error, Debug)]
pub enum GitSvError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not compile regex '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Branch error: {0}")]
    Branch(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("message should be valid according with conventional commits")]
    InvalidFormat,

    #[error("message type should be one of [{expected}]")]
    InvalidType { expected: String },

    #[error("message scope should be one of [{expected}]")]
    InvalidScope { expected: String },

    #[error("description should start with a lowercase letter")]
    InvalidDescription,

    #[error("could not find issue id using configured regex")]
    IssueNotFound,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-sv
pub type Result<T> = std::result::Result<T, GitSvError>;

impl GitSvError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GitSvError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        GitSvError::Version(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        GitSvError::Tag(msg.into())
    }

    /// Create a branch error with context
    pub fn branch(msg: impl Into<String>) -> Self {
        GitSvError::Branch(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        GitSvError::Remote(msg.into())
    }

    /// Wrap a regex compile failure together with the offending pattern
    pub fn regex(pattern: impl Into<String>, source: regex::Error) -> Self {
        GitSvError::Regex {
            pattern: pattern.into(),
            source,
        }
    }

    /// True for the errors produced by commit message validation
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GitSvError::InvalidFormat
                | GitSvError::InvalidType { .. }
                | GitSvError::InvalidScope { .. }
                | GitSvError::InvalidDescription
        )
    }
}
