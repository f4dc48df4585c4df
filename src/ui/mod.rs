//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts and user input handling

use std::io::{self, BufRead, Write};

use anyhow::Result;
use regex::Regex;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_error, display_notice, display_success, format_changelog, format_release_note,
};

/// Prompts for a line of text until it matches `pattern`.
///
/// An empty answer selects `default` when one is given. Invalid answers are
/// reported and asked again.
///
/// # Arguments
/// * `input` - Where answers are read from
/// * `output` - Where the prompt is written
/// * `label` - Prompt text, without trailing colon
/// * `pattern` - Regex the answer must match
/// * `default` - Value used for an empty answer
///
/// # Returns
/// * `Ok(String)` - The accepted answer, trimmed
/// * `Err` - If input ends before a valid answer or an I/O error occurs
pub fn prompt_text_from<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    pattern: &str,
    default: Option<&str>,
) -> Result<String> {
    let validator = Regex::new(pattern)?;

    loop {
        match default.filter(|d| !d.is_empty()) {
            Some(default) => write!(output, "{} [{}]: ", label, default)?,
            None => write!(output, "{}: ", label)?,
        }
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(anyhow::anyhow!("no answer given for '{}'", label));
        }

        let answer = match line.trim() {
            "" => default.unwrap_or_default(),
            answer => answer,
        };
        if validator.is_match(answer) {
            return Ok(answer.to_string());
        }
        writeln!(output, "invalid value, expected: {}", pattern)?;
    }
}

/// [`prompt_text_from`] on stdin and stdout
pub fn prompt_text(label: &str, pattern: &str, default: Option<&str>) -> Result<String> {
    prompt_text_from(
        &mut io::stdin().lock(),
        &mut io::stdout(),
        label,
        pattern,
        default,
    )
}

/// Prompts for a multi-line body; an empty line finishes it
pub fn prompt_body_from<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String> {
    let mut lines = Vec::new();
    loop {
        write!(output, "body (leave empty to finish): ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        lines.push(line.to_string());
    }
    Ok(lines.join("\n"))
}

/// [`prompt_body_from`] on stdin and stdout
pub fn prompt_body() -> Result<String> {
    prompt_body_from(&mut io::stdin().lock(), &mut io::stdout())
}

/// Prompts user to confirm an action with a yes/no prompt.
///
/// Accepts "y" or "yes" (case-insensitive) as confirmation.
/// Default is "no" if user presses Enter.
///
/// # Arguments
/// * `prompt` - The prompt message to display (without the "(y/N): " suffix)
///
/// # Returns
/// * `Ok(true)` - If user entered "y" or "yes"
/// * `Ok(false)` - Otherwise (including Enter, or "n"/"no")
/// * `Err` - If input error occurs
pub fn confirm_action(prompt: &str) -> Result<bool> {
    print!("{} (y/N): ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let response = input.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}
