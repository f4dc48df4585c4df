use crate::error::{GitSvError, Result};
use regex::Regex;

const VERSION_PLACEHOLDER: &str = "{version}";

/// Tag naming pattern (e.g., "v{version}", "release-{version}")
#[derive(Debug, Clone)]
pub struct TagPattern {
    pattern: String,
    matcher: Regex,
}

impl TagPattern {
    /// Compile a tag pattern; it must contain the `{version}` placeholder
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if !pattern.contains(VERSION_PLACEHOLDER) {
            return Err(GitSvError::tag(format!(
                "Pattern '{}' must contain {} placeholder",
                pattern, VERSION_PLACEHOLDER
            )));
        }

        let escaped = regex::escape(&pattern);
        let regex_pattern = format!(
            "^{}$",
            escaped.replace(r"\{version\}", r"(\d+(?:\.\d+){0,2}(?:-[0-9A-Za-z.-]+)?)")
        );
        let matcher =
            Regex::new(&regex_pattern).map_err(|e| GitSvError::regex(&regex_pattern, e))?;

        Ok(TagPattern { pattern, matcher })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Format a version according to pattern
    /// Example: pattern="v{version}", version="1.2.3" -> "v1.2.3"
    pub fn format(&self, version: &str) -> String {
        self.pattern.replace(VERSION_PLACEHOLDER, version)
    }

    /// Check whether a tag was produced by this pattern
    pub fn matches(&self, tag: &str) -> bool {
        self.matcher.is_match(tag)
    }

    /// Extract the version part of a tag, `None` if the tag does not match
    pub fn version_part<'t>(&self, tag: &'t str) -> Option<&'t str> {
        self.matcher
            .captures(tag)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    }
}
