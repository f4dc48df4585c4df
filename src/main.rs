use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use git_sv::cli::orchestration::{
    ChangelogOptions, CommitRequest, TagOutcome, ValidationOutcome,
};
use git_sv::cli::{Cli, Command, CommitArgs, ConfigCommand, Workflow};
use git_sv::config::{self, Config};
use git_sv::domain::core_version;
use git_sv::git::Git2Repository;
use git_sv::{ui, GitSvError};

fn main() {
    // RUST_LOG controls verbosity; logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        ui::display_error(&e.to_string());

        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("  Caused by: {err}");
            source = err.source();
        }

        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    if let Command::Config(ConfigCommand::Default) = cli.command {
        print!("{}", Config::default().to_toml()?);
        return Ok(());
    }

    let repo = Git2Repository::open(".").context("not inside a git repository")?;
    let config = config::load_config(repo.workdir(), config_path)
        .context("could not load configuration")?;
    let workflow = Workflow::new(&repo, config)?;

    match cli.command {
        Command::Config(ConfigCommand::Default) => {}
        Command::Config(ConfigCommand::Show) => {
            print!("{}", workflow.config().to_toml()?);
        }
        Command::CurrentVersion => {
            let version = workflow.current_version()?;
            println!("{}", core_version(&version));
        }
        Command::NextVersion => {
            let next = workflow.next_version()?;
            println!("{}", core_version(&next.next));
        }
        Command::CommitLog(args) => {
            let range = workflow.resolve_range(
                args.bounds.range,
                args.bounds.start.as_deref(),
                args.bounds.end.as_deref(),
            )?;
            let commits = workflow
                .commit_log(args.tag.as_deref(), &range)
                .context("error getting git log")?;
            for commit in commits {
                println!("{}", serde_json::to_string(&commit)?);
            }
        }
        Command::CommitNotes(args) => {
            let range =
                workflow.resolve_range(args.range, args.start.as_deref(), args.end.as_deref())?;
            let note = workflow.commit_notes(&range)?;
            println!("{}", ui::format_release_note(&note));
        }
        Command::ReleaseNotes(args) => {
            let note = workflow.release_note(args.tag.as_deref())?;
            println!("{}", ui::format_release_note(&note));
        }
        Command::Changelog(args) => {
            let options = ChangelogOptions {
                size: args.size,
                all: args.all,
                add_next_version: args.add_next_version,
                semantic_version_only: args.semantic_version_only,
            };
            let changelog = workflow.changelog(&options)?;
            for notice in &changelog.notices {
                ui::display_notice(notice);
            }
            println!("{}", ui::format_changelog(&changelog.notes));
        }
        Command::Tag(args) => match workflow.tag(&args.remote, !args.no_push)? {
            TagOutcome::Created { tag, version, pushed } => {
                println!("{}", core_version(&version));
                if pushed {
                    ui::display_success(&format!("Tag {} pushed to {}", tag, args.remote));
                } else {
                    ui::display_success(&format!("Tag {} created locally", tag));
                }
            }
            TagOutcome::Skipped(notice) => ui::display_notice(&notice),
        },
        Command::Commit(args) => {
            let request = commit_request(&workflow, args)?;
            workflow
                .commit(&request)
                .map_err(|e| with_context(e, "error executing git commit"))?;
        }
        Command::ValidateCommitMessage(args) => {
            let outcome = workflow
                .validate_commit_message(&args.path, &args.file, &args.source)
                .map_err(|e| with_context(e, "could not check commit message"))?;
            match outcome {
                ValidationOutcome::Skipped(notice) => ui::display_notice(&notice),
                ValidationOutcome::Valid { notice, .. } => {
                    if let Some(notice) = notice {
                        ui::display_notice(&notice);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Name validation failures as such; other failures get `fallback`
fn with_context(err: GitSvError, fallback: &'static str) -> anyhow::Error {
    let context = if err.is_validation() {
        "invalid commit message"
    } else {
        fallback
    };
    anyhow::Error::new(err).context(context)
}

/// Fill in what the command line left out, asking on stdin.
///
/// Running without `--type` starts the interactive mode, which also asks
/// for scope, body, issue and breaking changes.
fn commit_request(
    workflow: &Workflow<'_, Git2Repository>,
    args: CommitArgs,
) -> Result<CommitRequest> {
    let message_cfg = &workflow.config().commit_message;
    let interactive = args.commit_type.is_none();

    let commit_type = match args.commit_type {
        Some(commit_type) => commit_type,
        None => {
            let types = message_cfg.types.join("|");
            println!("types: {}", message_cfg.types.join(", "));
            ui::prompt_text("type", &format!("^({})$", types), None)?
        }
    };

    let scope = match args.scope {
        Some(scope) => scope,
        None if interactive => {
            let values = &message_cfg.scope.values;
            if values.is_empty() {
                ui::prompt_text("scope", "^[a-z0-9-]*$", None)?
            } else {
                println!("scopes: {}", values.join(", "));
                let allowed: Vec<String> = values.iter().map(|v| regex::escape(v)).collect();
                ui::prompt_text("scope", &format!("^({})$", allowed.join("|")), None)?
            }
        }
        None => String::new(),
    };

    let description = match args.description {
        Some(description) => description,
        None => ui::prompt_text("description", "^[a-z].+$", None)?,
    };

    let body = match args.body {
        Some(body) => body,
        None if interactive => ui::prompt_body()?,
        None => String::new(),
    };

    let issue_enabled =
        message_cfg.issue_footer().is_enabled() && !message_cfg.issue.regex.is_empty();
    let issue = match args.issue {
        Some(issue) => Some(issue),
        None if interactive && issue_enabled => {
            let branch_issue = workflow.branch_issue()?;
            Some(ui::prompt_text(
                "issue id",
                &format!("^({})?$", message_cfg.issue.regex),
                Some(branch_issue.as_str()),
            )?)
        }
        None => None,
    };

    let breaking_change = match args.breaking_change {
        Some(breaking_change) => breaking_change,
        None if interactive && ui::confirm_action("has breaking changes?")? => {
            ui::prompt_text("breaking changes description", "[a-z].+", None)?
        }
        None => String::new(),
    };

    Ok(CommitRequest {
        commit_type,
        scope,
        description,
        body,
        issue,
        breaking_change,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_get_message_context() {
        let err = with_context(GitSvError::InvalidDescription, "error executing git commit");
        assert_eq!(err.to_string(), "invalid commit message");

        let err = with_context(GitSvError::IssueNotFound, "could not check commit message");
        assert_eq!(err.to_string(), "could not check commit message");
    }
}
