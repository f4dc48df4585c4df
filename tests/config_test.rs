// tests/config_test.rs
use git_sv::config::{load_config, Config, SectionType, HOME_ENV, REPO_CONFIG_FILENAME};
use serial_test::serial;
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

/// Points the user configuration at an empty temporary home
fn isolated_home() -> TempDir {
    let home = TempDir::new().unwrap();
    std::env::set_var(HOME_ENV, home.path());
    home
}

#[test]
#[serial]
fn test_load_defaults_without_files() {
    let _home = isolated_home();
    let repo = TempDir::new().unwrap();

    let config = load_config(Some(repo.path()), None).expect("Should load default config");
    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn test_repository_config_overrides_user_config() {
    let home = isolated_home();
    fs::write(
        home.path().join("config.toml"),
        r#"
[tag]
pattern = "v{version}"

[versioning]
ignore_unknown = true
"#,
    )
    .unwrap();

    let repo = TempDir::new().unwrap();
    fs::write(
        repo.path().join(REPO_CONFIG_FILENAME),
        r##"
[tag]
pattern = "release-{version}"

[commit_message.issue]
regex = "#?[0-9]+"
"##,
    )
    .unwrap();

    let config = load_config(Some(repo.path()), None).unwrap();
    assert_eq!(config.tag.pattern, "release-{version}");
    assert!(
        config.versioning.ignore_unknown,
        "user layer should survive where the repository layer is silent"
    );
    assert_eq!(config.commit_message.issue.regex, "#?[0-9]+");
    assert_eq!(
        config.commit_message.issue_footer().key,
        "jira",
        "footers should keep their defaults when only the issue regex changes"
    );
}

#[test]
#[serial]
fn test_arrays_replace_lower_layers() {
    let _home = isolated_home();
    let repo = TempDir::new().unwrap();
    fs::write(
        repo.path().join(REPO_CONFIG_FILENAME),
        r#"
[commit_message]
types = ["feat", "fix"]

[[release_notes.sections]]
name = "Changes"
section_type = "commits"
commit_types = ["feat", "fix"]

[[release_notes.sections]]
name = "Breaking"
section_type = "breaking-changes"
"#,
    )
    .unwrap();

    let config = load_config(Some(repo.path()), None).unwrap();
    assert_eq!(config.commit_message.types, vec!["feat", "fix"]);
    assert_eq!(config.release_notes.sections.len(), 2);
    assert_eq!(
        config.release_notes.sections[1].section_type,
        SectionType::BreakingChanges
    );
}

#[test]
#[serial]
fn test_explicit_config_replaces_user_and_repository_layers() {
    let home = isolated_home();
    fs::write(
        home.path().join("config.toml"),
        "[tag]\npattern = \"user-{version}\"\n",
    )
    .unwrap();

    let mut explicit = NamedTempFile::new().unwrap();
    explicit
        .write_all(b"[branches]\nskip = [\"trunk\"]\n")
        .unwrap();
    explicit.flush().unwrap();

    let config = load_config(None, Some(explicit.path())).unwrap();
    assert_eq!(config.tag.pattern, "{version}");
    assert_eq!(config.branches.skip, vec!["trunk"]);
}

#[test]
#[serial]
fn test_missing_explicit_config_is_error() {
    let _home = isolated_home();
    let dir = TempDir::new().unwrap();
    let result = load_config(None, Some(&dir.path().join("missing.toml")));
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_invalid_toml_is_error() {
    let _home = isolated_home();
    let repo = TempDir::new().unwrap();
    fs::write(repo.path().join(REPO_CONFIG_FILENAME), "[tag\npattern = ").unwrap();

    let err = load_config(Some(repo.path()), None).unwrap_err();
    assert!(err.to_string().contains(REPO_CONFIG_FILENAME));
}

#[test]
#[serial]
fn test_invalid_layout_rejected_after_merge() {
    let _home = isolated_home();
    let repo = TempDir::new().unwrap();
    fs::write(
        repo.path().join(REPO_CONFIG_FILENAME),
        r#"
[[release_notes.sections]]
name = "Features"
commit_types = ["feat"]

[[release_notes.sections]]
name = "New Stuff"
commit_types = ["feat"]
"#,
    )
    .unwrap();

    assert!(load_config(Some(repo.path()), None).is_err());
}

#[test]
#[serial]
fn test_tag_pattern_without_placeholder_rejected() {
    let _home = isolated_home();
    let repo = TempDir::new().unwrap();
    fs::write(
        repo.path().join(REPO_CONFIG_FILENAME),
        "[tag]\npattern = \"release\"\n",
    )
    .unwrap();

    assert!(load_config(Some(repo.path()), None).is_err());
}
