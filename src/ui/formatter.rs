//! Formatting functions for UI output.
//!
//! Markdown rendering of release notes is pure and returns strings. The
//! `display_*` helpers print status lines with `console` styling.

use console::style;

use crate::domain::{core_version, GitCommitLog, ReleaseNote, ReleaseNoteSection};
use crate::notice::Notice;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

/// Display a notice to the user.
///
/// Shows a yellow warning icon followed by the notice text, on stderr so
/// command output stays machine readable.
pub fn display_notice(notice: &Notice) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), notice);
}

fn heading(note: &ReleaseNote) -> String {
    let title = match &note.version {
        Some(version) => format!("v{}", core_version(version)),
        None => note.tag.clone(),
    };
    let date = note.date.map(|date| date.format("%Y-%m-%d").to_string());

    match (title.is_empty(), date) {
        (false, Some(date)) => format!("## {} ({})", title, date),
        (false, None) => format!("## {}", title),
        (true, Some(date)) => format!("## {}", date),
        (true, None) => "##".to_string(),
    }
}

/// One bullet line for a commit: `- **scope:** description (hash) (issue)`
pub fn format_commit_item(commit: &GitCommitLog) -> String {
    let message = &commit.message;
    let mut line = String::from("- ");
    if let Some(scope) = message.scope.as_deref().filter(|s| !s.is_empty()) {
        line.push_str(&format!("**{}:** ", scope));
    }
    line.push_str(&format!("{} ({})", message.description, commit.hash));
    if !message.issue().is_empty() {
        line.push_str(&format!(" ({})", message.issue()));
    }
    line
}

/// Render a release note as markdown.
///
/// # Arguments
/// * `note` - Release note whose sections are already in display order
///
/// # Returns
/// Markdown ending with a newline
pub fn format_release_note(note: &ReleaseNote) -> String {
    let mut out = heading(note);
    out.push('\n');

    for section in &note.sections {
        out.push_str(&format!("\n### {}\n\n", section.name()));
        match section {
            ReleaseNoteSection::Commits(section) => {
                for item in &section.items {
                    out.push_str(&format_commit_item(item));
                    out.push('\n');
                }
            }
            ReleaseNoteSection::BreakingChanges(section) => {
                for message in &section.messages {
                    out.push_str(&format!("- {}\n", message));
                }
            }
        }
    }

    out
}

/// Render release notes, newest first, as a markdown changelog
pub fn format_changelog(notes: &[ReleaseNote]) -> String {
    let mut out = String::from("# Changelog\n");
    for note in notes {
        out.push('\n');
        out.push_str(&format_release_note(note));
        out.push_str("---\n");
    }
    out
}
