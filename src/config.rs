use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{TagPattern, BREAKING_CHANGE_METADATA_KEY, ISSUE_METADATA_KEY};
use crate::error::{GitSvError, Result};

/// Environment variable pointing at the user configuration directory
pub const HOME_ENV: &str = "GIT_SV_HOME";
/// File name of the user configuration inside the home directory
pub const CONFIG_FILENAME: &str = "config.toml";
/// File name of the repository configuration, at the repository root
pub const REPO_CONFIG_FILENAME: &str = ".git-sv.toml";

/// Represents the complete configuration for git-sv.
///
/// Every field has a default, so partial files only need to name what they change.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub version: String,
    pub versioning: VersioningConfig,
    pub tag: TagConfig,
    pub release_notes: ReleaseNotesConfig,
    pub branches: BranchesConfig,
    pub commit_message: CommitMessageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version: "1.0".to_string(),
            versioning: VersioningConfig::default(),
            tag: TagConfig::default(),
            release_notes: ReleaseNotesConfig::default(),
            branches: BranchesConfig::default(),
            commit_message: CommitMessageConfig::default(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Commit types that drive each kind of version increment.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct VersioningConfig {
    pub update_major: Vec<String>,
    pub update_minor: Vec<String>,
    pub update_patch: Vec<String>,
    /// When false, types outside `commit_message.types` bump the patch version
    pub ignore_unknown: bool,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        VersioningConfig {
            update_major: Vec::new(),
            update_minor: strings(&["feat"]),
            update_patch: strings(&[
                "build", "ci", "chore", "docs", "fix", "perf", "refactor", "style", "test",
            ]),
            ignore_unknown: false,
        }
    }
}

/// Tag naming; `pattern` must contain `{version}`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct TagConfig {
    pub pattern: String,
}

impl Default for TagConfig {
    fn default() -> Self {
        TagConfig {
            pattern: "{version}".to_string(),
        }
    }
}

/// Kind of content a release note section holds
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SectionType {
    #[default]
    Commits,
    BreakingChanges,
}

/// One heading of the release notes
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SectionConfig {
    pub name: String,
    #[serde(default)]
    pub section_type: SectionType,
    #[serde(default)]
    pub commit_types: Vec<String>,
}

impl SectionConfig {
    pub fn commits(name: &str, commit_types: &[&str]) -> Self {
        SectionConfig {
            name: name.to_string(),
            section_type: SectionType::Commits,
            commit_types: strings(commit_types),
        }
    }

    pub fn breaking_changes(name: &str) -> Self {
        SectionConfig {
            name: name.to_string(),
            section_type: SectionType::BreakingChanges,
            commit_types: Vec::new(),
        }
    }
}

/// Release note sections, rendered in declaration order.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ReleaseNotesConfig {
    pub sections: Vec<SectionConfig>,
}

impl Default for ReleaseNotesConfig {
    fn default() -> Self {
        ReleaseNotesConfig {
            sections: vec![
                SectionConfig::commits("Features", &["feat"]),
                SectionConfig::commits("Bug Fixes", &["fix"]),
                SectionConfig::breaking_changes("Breaking Changes"),
            ],
        }
    }
}

impl ReleaseNotesConfig {
    /// Reject ambiguous section layouts.
    ///
    /// At most one breaking changes section may exist and a commit type may
    /// belong to a single commits section.
    pub fn validate(&self) -> Result<()> {
        let breaking_sections = self
            .sections
            .iter()
            .filter(|s| s.section_type == SectionType::BreakingChanges)
            .count();
        if breaking_sections > 1 {
            return Err(GitSvError::config(format!(
                "expected at most one breaking-changes section, found {}",
                breaking_sections
            )));
        }

        let mut owners: HashMap<&str, &str> = HashMap::new();
        for section in &self.sections {
            if section.section_type != SectionType::Commits {
                continue;
            }
            for commit_type in &section.commit_types {
                if let Some(previous) = owners.insert(commit_type.as_str(), section.name.as_str()) {
                    return Err(GitSvError::config(format!(
                        "commit type '{}' is mapped by sections '{}' and '{}'",
                        commit_type, previous, section.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Branch naming conventions used to find issue ids and skip validation.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct BranchesConfig {
    pub prefix_regex: String,
    pub suffix_regex: String,
    pub disable_issue: bool,
    pub skip: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_detached: Option<bool>,
}

impl Default for BranchesConfig {
    fn default() -> Self {
        BranchesConfig {
            prefix_regex: r"([a-z]+\/)?".to_string(),
            suffix_regex: "(-.*)?".to_string(),
            disable_issue: false,
            skip: strings(&["master", "main", "developer"]),
            skip_detached: Some(false),
        }
    }
}

/// A footer line such as `jira: ABC-1` or `refs #12`.
///
/// An empty `key` disables the footer.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct FooterConfig {
    pub key: String,
    pub key_synonyms: Vec<String>,
    /// Use `key #value` instead of `key: value`
    pub use_hash: bool,
    /// Prepended to values that do not already start with it
    pub add_value_prefix: String,
}

impl FooterConfig {
    pub fn is_enabled(&self) -> bool {
        !self.key.is_empty()
    }

    /// Canonical key followed by its synonyms
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.as_str()).chain(self.key_synonyms.iter().map(String::as_str))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ScopeConfig {
    /// Allowed scopes; empty allows anything. Include "" to allow no scope.
    pub values: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct IssueConfig {
    pub regex: String,
}

/// Conventional commit rules.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CommitMessageConfig {
    pub types: Vec<String>,
    pub scope: ScopeConfig,
    pub footer: BTreeMap<String, FooterConfig>,
    pub issue: IssueConfig,
}

impl Default for CommitMessageConfig {
    fn default() -> Self {
        let mut footer = BTreeMap::new();
        footer.insert(
            ISSUE_METADATA_KEY.to_string(),
            FooterConfig {
                key: "jira".to_string(),
                key_synonyms: strings(&["Jira", "JIRA"]),
                ..FooterConfig::default()
            },
        );
        footer.insert(
            BREAKING_CHANGE_METADATA_KEY.to_string(),
            FooterConfig {
                key: "BREAKING CHANGE".to_string(),
                key_synonyms: strings(&["BREAKING CHANGES"]),
                ..FooterConfig::default()
            },
        );

        CommitMessageConfig {
            types: strings(&[
                "build", "ci", "chore", "docs", "feat", "fix", "perf", "refactor", "revert",
                "style", "test",
            ]),
            scope: ScopeConfig::default(),
            footer,
            issue: IssueConfig {
                regex: "[A-Z]+-[0-9]+".to_string(),
            },
        }
    }
}

impl CommitMessageConfig {
    /// Footer configured for issue ids; disabled when missing
    pub fn issue_footer(&self) -> FooterConfig {
        self.footer
            .get(ISSUE_METADATA_KEY)
            .cloned()
            .unwrap_or_default()
    }
}

impl Config {
    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<()> {
        TagPattern::new(self.tag.pattern.as_str())
            .map_err(|e| GitSvError::config(format!("invalid tag pattern: {}", e)))?;
        self.release_notes.validate()
    }

    /// Render as TOML, as written in a configuration file
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self)
            .map_err(|e| GitSvError::config(format!("could not serialize config: {}", e)))
    }
}

/// Location of the user configuration file.
///
/// `$GIT_SV_HOME/config.toml` when the variable is set, otherwise
/// `git-sv/config.toml` in the platform configuration directory.
pub fn user_config_path() -> Option<PathBuf> {
    match std::env::var(HOME_ENV) {
        Ok(home) if !home.is_empty() => Some(PathBuf::from(home).join(CONFIG_FILENAME)),
        _ => dirs::config_dir().map(|dir| dir.join("git-sv").join(CONFIG_FILENAME)),
    }
}

/// Loads configuration layered over the defaults.
///
/// Layers, lowest priority first:
/// 1. Built-in defaults
/// 2. User configuration (see [`user_config_path`])
/// 3. `.git-sv.toml` at `repo_root`
///
/// An explicit `config_path` replaces layers 2 and 3. Tables merge key by
/// key while arrays and scalars replace the lower layer's value.
///
/// # Returns
/// * `Ok(Config)` - Resolved and validated configuration
/// * `Err` - If a file exists but cannot be read or parsed, or the result is invalid
pub fn load_config(repo_root: Option<&Path>, config_path: Option<&Path>) -> Result<Config> {
    let mut merged = toml::Value::try_from(Config::default())
        .map_err(|e| GitSvError::config(format!("could not serialize defaults: {}", e)))?;

    let layers: Vec<PathBuf> = match config_path {
        Some(path) => {
            if !path.exists() {
                return Err(GitSvError::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            vec![path.to_path_buf()]
        }
        None => user_config_path()
            .into_iter()
            .chain(repo_root.map(|root| root.join(REPO_CONFIG_FILENAME)))
            .filter(|path| path.exists())
            .collect(),
    };

    for path in layers {
        tracing::debug!("loading config layer {}", path.display());
        merge_values(&mut merged, read_layer(&path)?);
    }

    let config: Config = merged
        .try_into()
        .map_err(|e| GitSvError::config(format!("invalid configuration: {}", e)))?;
    config.validate()?;
    Ok(config)
}

fn read_layer(path: &Path) -> Result<toml::Value> {
    let content = fs::read_to_string(path)?;
    let table: toml::Table = toml::from_str(&content).map_err(|e| {
        GitSvError::config(format!(
            "could not parse config from path: {}, error: {}",
            path.display(),
            e
        ))
    })?;
    Ok(toml::Value::Table(table))
}

fn merge_values(base: &mut toml::Value, layer: toml::Value) {
    match (base, layer) {
        (toml::Value::Table(base), toml::Value::Table(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_default_issue_footer() {
        let config = CommitMessageConfig::default();
        let issue = config.issue_footer();
        assert_eq!(issue.key, "jira");
        assert_eq!(
            issue.prefixes().collect::<Vec<_>>(),
            vec!["jira", "Jira", "JIRA"]
        );
    }

    #[test]
    fn test_missing_footer_is_disabled() {
        let config = CommitMessageConfig {
            footer: BTreeMap::new(),
            ..CommitMessageConfig::default()
        };
        assert!(!config.issue_footer().is_enabled());
    }

    #[test]
    fn test_duplicate_commit_type_rejected() {
        let config = ReleaseNotesConfig {
            sections: vec![
                SectionConfig::commits("Features", &["feat"]),
                SectionConfig::commits("More Features", &["feat"]),
            ],
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'feat'"));
    }

    #[test]
    fn test_two_breaking_sections_rejected() {
        let config = ReleaseNotesConfig {
            sections: vec![
                SectionConfig::breaking_changes("Breaking"),
                SectionConfig::breaking_changes("Also Breaking"),
            ],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tag_pattern_without_placeholder_rejected() {
        let config = Config {
            tag: TagConfig {
                pattern: "release".to_string(),
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_tables_and_replace_arrays() {
        let mut base: toml::Value = toml::from_str::<toml::Table>(
            "[a]\nx = 1\ny = [1, 2]\n[a.inner]\nz = \"keep\"",
        )
        .map(toml::Value::Table)
        .unwrap();
        let layer: toml::Value = toml::from_str::<toml::Table>("[a]\ny = [3]\n[a.inner]\nw = true")
            .map(toml::Value::Table)
            .unwrap();

        merge_values(&mut base, layer);

        let a = base.get("a").unwrap();
        assert_eq!(a.get("x").and_then(|v| v.as_integer()), Some(1));
        assert_eq!(a.get("y").and_then(|v| v.as_array()).map(|v| v.len()), Some(1));
        let inner = a.get("inner").unwrap();
        assert_eq!(inner.get("z").and_then(|v| v.as_str()), Some("keep"));
        assert_eq!(inner.get("w").and_then(|v| v.as_bool()), Some(true));
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config::default();
        let text = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
