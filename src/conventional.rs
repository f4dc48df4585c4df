//! Conventional commit message processing.
//!
//! [`MessageProcessor`] turns raw subject and body text into a
//! [`CommitMessage`] and back, validates messages written by hand, and
//! derives issue footers from branch names for the commit hook.

use regex::Regex;
use std::collections::BTreeMap;

use crate::config::{BranchesConfig, CommitMessageConfig, FooterConfig};
use crate::domain::{
    CommitMessage, BREAKING_CHANGE_FOOTER_KEY, BREAKING_CHANGE_METADATA_KEY, ISSUE_METADATA_KEY,
};
use crate::error::{GitSvError, Result};

const SUBJECT_PATTERN: &str = r"^([a-z]+)(\(([^)]*)\))?(!)?: (.*)$";
const VALID_SUBJECT_PATTERN: &str = r"^[a-z+]+(\(.+\))?!?: .+$";
const FOOTER_LINE_PATTERN: &str = r"^(?:[a-zA-Z-]+: |[a-zA-Z-]+ #|BREAKING CHANGE: )";

/// Matchers for one configured footer, canonical key first
#[derive(Debug, Clone)]
struct FooterMatcher {
    name: String,
    patterns: Vec<Regex>,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| GitSvError::regex(pattern, e))
}

/// Capture the value of a footer line; hash style keeps the `#` in the value
fn footer_pattern(prefix: &str, use_hash: bool) -> Result<Regex> {
    let escaped = regex::escape(prefix);
    if use_hash {
        compile(&format!(r"(?m)^{} (#.*)$", escaped))
    } else {
        compile(&format!(r"(?m)^{}: (.*)$", escaped))
    }
}

/// Match a footer line carrying at least one character after `: ` or ` #`
fn presence_pattern(prefix: &str, use_hash: bool) -> Result<Regex> {
    let escaped = regex::escape(prefix);
    if use_hash {
        compile(&format!(r"(?m)^{} #.+$", escaped))
    } else {
        compile(&format!(r"(?m)^{}: .+$", escaped))
    }
}

/// First non-empty value captured by `pattern` in `text`
fn capture_value(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Render a footer line for `value`, honouring hash style and value prefix
pub fn footer_line(footer: &FooterConfig, value: &str) -> String {
    let prefix = footer.add_value_prefix.as_str();
    let value = if prefix.is_empty() || value.starts_with(prefix) {
        value.to_string()
    } else {
        format!("{}{}", prefix, value)
    };

    if footer.use_hash {
        format!("{} #{}", footer.key, value.trim_start_matches('#'))
    } else {
        format!("{}: {}", footer.key, value)
    }
}

/// Split a full message into its first line and the remaining lines joined by `\n`
pub fn split_message(message: &str) -> (String, String) {
    let mut lines = message.lines();
    let subject = lines.next().unwrap_or_default().to_string();
    let body = lines.collect::<Vec<_>>().join("\n");
    (subject, body)
}

/// Parses, formats and validates conventional commit messages.
///
/// Built once from resolved configuration; every method takes `&self`, so a
/// processor can be shared freely between callers.
#[derive(Debug, Clone)]
pub struct MessageProcessor {
    message_cfg: CommitMessageConfig,
    branches_cfg: BranchesConfig,
    footers: Vec<FooterMatcher>,
    /// Issue footer lines under the key or any synonym
    issue_presence: Vec<Regex>,
    breaking_change: Regex,
    subject: Regex,
    valid_subject: Regex,
    footer_line: Regex,
}

impl MessageProcessor {
    /// Create a processor, compiling the footer matchers up front
    pub fn new(message_cfg: CommitMessageConfig, branches_cfg: BranchesConfig) -> Result<Self> {
        let mut footers = Vec::new();
        for (name, footer) in &message_cfg.footer {
            if !footer.is_enabled() {
                continue;
            }
            let patterns = footer
                .prefixes()
                .map(|prefix| footer_pattern(prefix, footer.use_hash))
                .collect::<Result<Vec<_>>>()?;
            footers.push(FooterMatcher {
                name: name.clone(),
                patterns,
            });
        }

        let issue_footer = message_cfg.issue_footer();
        let issue_presence = if issue_footer.is_enabled() {
            issue_footer
                .prefixes()
                .map(|prefix| presence_pattern(prefix, issue_footer.use_hash))
                .collect::<Result<Vec<_>>>()?
        } else {
            Vec::new()
        };

        Ok(MessageProcessor {
            footers,
            issue_presence,
            breaking_change: footer_pattern(BREAKING_CHANGE_FOOTER_KEY, false)?,
            subject: compile(SUBJECT_PATTERN)?,
            valid_subject: compile(VALID_SUBJECT_PATTERN)?,
            footer_line: compile(FOOTER_LINE_PATTERN)?,
            message_cfg,
            branches_cfg,
        })
    }

    /// Parse a subject line and body into a [`CommitMessage`].
    ///
    /// Never fails: a subject outside the conventional shape becomes the
    /// description of a message with an empty type.
    pub fn parse(&self, subject: &str, body: &str) -> CommitMessage {
        let Some(captures) = self.subject.captures(subject.trim_end()) else {
            return CommitMessage {
                description: subject.to_string(),
                body: body.to_string(),
                ..CommitMessage::default()
            };
        };

        let r#type = captures
            .get(1)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let scope = captures
            .get(3)
            .map(|m| m.as_str().to_string())
            .filter(|scope| !scope.is_empty());
        let mut is_breaking_change = captures.get(4).is_some();
        let description = captures
            .get(5)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        let mut metadata = BTreeMap::new();
        for footer in &self.footers {
            if let Some(value) = footer
                .patterns
                .iter()
                .find_map(|pattern| capture_value(pattern, body))
            {
                metadata.insert(footer.name.clone(), value);
            }
        }
        if let Some(value) = capture_value(&self.breaking_change, body) {
            metadata.insert(BREAKING_CHANGE_METADATA_KEY.to_string(), value);
        }
        is_breaking_change |= metadata.contains_key(BREAKING_CHANGE_METADATA_KEY);

        CommitMessage {
            r#type,
            scope,
            description,
            body: body.to_string(),
            is_breaking_change,
            metadata,
        }
    }

    /// Render a message as `(header, body, footer)` for `git commit`
    pub fn format(&self, msg: &CommitMessage) -> (String, String, String) {
        let mut header = msg.r#type.clone();
        if let Some(scope) = msg.scope.as_deref().filter(|s| !s.is_empty()) {
            header.push('(');
            header.push_str(scope);
            header.push(')');
        }
        header.push_str(": ");
        header.push_str(&msg.description);

        let mut footer_lines = Vec::new();
        if !msg.breaking_message().is_empty() {
            footer_lines.push(format!(
                "{}: {}",
                BREAKING_CHANGE_FOOTER_KEY,
                msg.breaking_message()
            ));
        }
        let issue_footer = self.message_cfg.issue_footer();
        if issue_footer.is_enabled() && !msg.issue().is_empty() {
            footer_lines.push(footer_line(&issue_footer, msg.issue()));
        }

        (header, msg.body.clone(), footer_lines.join("\n"))
    }

    /// Validate a full commit message; the first failing rule is returned
    pub fn validate(&self, message: &str) -> Result<()> {
        let (subject, body) = split_message(message);

        if !self.valid_subject.is_match(&subject) {
            return Err(GitSvError::InvalidFormat);
        }

        let msg = self.parse(&subject, &body);
        let types = &self.message_cfg.types;
        if msg.r#type.is_empty() || !types.contains(&msg.r#type) {
            return Err(GitSvError::InvalidType {
                expected: types.join(", "),
            });
        }

        let scopes = &self.message_cfg.scope.values;
        let scope = msg.scope.as_deref().unwrap_or_default();
        if !scopes.is_empty() && !scopes.iter().any(|allowed| allowed == scope) {
            return Err(GitSvError::InvalidScope {
                expected: scopes.join(", "),
            });
        }

        if !msg.description.chars().next().is_some_and(char::is_lowercase) {
            return Err(GitSvError::InvalidDescription);
        }

        Ok(())
    }

    /// Issue footer to append to `message`, derived from `branch`.
    ///
    /// # Returns
    /// * `Ok(None)` - Enhancement disabled or the message already names an issue
    /// * `Ok(Some(line))` - Footer to append; starts with a blank line when the
    ///   message has no footer block yet
    /// * `Err(GitSvError::IssueNotFound)` - The branch carries no issue id
    pub fn enhance(&self, branch: &str, message: &str) -> Result<Option<String>> {
        let issue_footer = self.message_cfg.issue_footer();
        if self.branches_cfg.disable_issue
            || !issue_footer.is_enabled()
            || self.message_cfg.issue.regex.is_empty()
            || self.has_issue_id(message)
        {
            return Ok(None);
        }

        let issue = self.issue_id(branch)?;
        if issue.is_empty() {
            return Err(GitSvError::IssueNotFound);
        }

        let line = footer_line(&issue_footer, &issue);
        if self.has_footer(message) {
            Ok(Some(line))
        } else {
            Ok(Some(format!("\n{}", line)))
        }
    }

    /// Extract the issue id from a branch name, empty if the branch has none
    pub fn issue_id(&self, branch: &str) -> Result<String> {
        if self.branches_cfg.disable_issue || self.message_cfg.issue.regex.is_empty() {
            return Ok(String::new());
        }

        let pattern = format!(
            "^{}(?P<issue>{}){}$",
            self.branches_cfg.prefix_regex,
            self.message_cfg.issue.regex,
            self.branches_cfg.suffix_regex
        );
        let regex = compile(&pattern)?;

        Ok(regex
            .captures(branch)
            .and_then(|captures| captures.name("issue"))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default())
    }

    /// Whether commit message checks should be skipped on this branch
    pub fn skip_branch(&self, branch: &str, is_detached: bool) -> bool {
        self.branches_cfg.skip.iter().any(|skip| skip == branch)
            || (self.branches_cfg.skip_detached == Some(true) && is_detached)
    }

    /// True if any line after the subject looks like a footer
    pub fn has_footer(&self, message: &str) -> bool {
        message
            .lines()
            .skip(1)
            .any(|line| self.footer_line.is_match(line))
    }

    /// True if the message already carries the issue footer.
    ///
    /// The canonical key and every synonym count, the same set `parse` accepts.
    pub fn has_issue_id(&self, message: &str) -> bool {
        self.issue_presence
            .iter()
            .any(|pattern| pattern.is_match(message))
    }
}
