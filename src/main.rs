mod ci;
mod client;
mod config;

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use client::{
    Comment, CommentThread, DevOpsClient, PullRequestStatus, StatusContext, StatusState,
};
use config::Config;

/// PR Decorator — CLI tool that publishes code-analysis results to a
/// pull request as status checks and threaded comments, and detects
/// pull-request context from CI environment variables.
#[derive(Parser, Debug)]
#[command(name = "pr-decorator", version, about)]
struct Cli {
    /// Base API URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Project identifier (overrides config)
    #[arg(long)]
    project: Option<String>,

    /// Repository identifier (overrides config)
    #[arg(long)]
    repository: Option<String>,

    /// Pull request id; resolved from the CI environment when omitted
    #[arg(long)]
    pull_request: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the pull-request context detected from CI environment variables
    Detect,

    /// Submit a status check against the pull request
    Status {
        /// One of: not-set, pending, succeeded, failed, error
        #[arg(long)]
        state: String,

        /// Human-readable status description
        #[arg(long)]
        description: String,

        /// Status name within its genre
        #[arg(long, default_value = "quality-gate")]
        name: String,

        /// Status genre (grouping namespace)
        #[arg(long, default_value = "code-analysis")]
        genre: String,

        /// Link back to the analysis results
        #[arg(long)]
        target_url: Option<String>,
    },

    /// List the comment threads on the pull request
    Threads,

    /// Create a comment thread, or add to an existing one with --thread
    Comment {
        /// Comment text (markdown)
        content: String,

        /// Existing thread id to append to
        #[arg(long)]
        thread: Option<i32>,
    },

    /// Close (mark resolved) a comment thread
    Resolve {
        /// Thread id to close
        thread: i32,
    },

    /// Fetch and print pull-request metadata
    Show,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::Detect = cli.command {
        let context = ci::detect();
        info!(platform = ?context.platform, "detected CI context");
        println!("{}", serde_json::to_string_pretty(&context)?);
        return Ok(());
    }

    info!("loading configuration");
    let config = Config::load()?;
    let client = build_client(&cli, &config)?;
    let pull_request_id = resolve_pull_request_id(cli.pull_request)?;
    debug!(pull_request = pull_request_id, "resolved pull request id");

    match cli.command {
        Command::Detect => unreachable!("handled before client construction"),
        Command::Status {
            state,
            description,
            name,
            genre,
            target_url,
        } => {
            let status = PullRequestStatus {
                state: parse_state(&state)?,
                description,
                context: StatusContext { name, genre },
                target_url,
            };
            client.submit_status(pull_request_id, &status)?;
            info!(state = %state, "status submitted");
        }
        Command::Threads => {
            let threads = client.list_threads(pull_request_id)?;
            info!(threads = threads.len(), "retrieved threads");
            println!("{}", serde_json::to_string_pretty(&threads)?);
        }
        Command::Comment {
            content,
            thread: Some(thread_id),
        } => {
            client.add_comment(pull_request_id, thread_id, &Comment::text(content))?;
            info!(thread = thread_id, "comment added");
        }
        Command::Comment {
            content,
            thread: None,
        } => {
            client.create_thread(pull_request_id, &CommentThread::with_comment(content))?;
            info!("thread created");
        }
        Command::Resolve { thread } => {
            client.resolve_thread(pull_request_id, thread)?;
            info!(thread, "thread closed");
        }
        Command::Show => {
            let pull_request = client.get_pull_request(pull_request_id)?;
            info!(title = %pull_request.title, "fetched pull request");
            println!("{}", serde_json::to_string_pretty(&pull_request)?);
        }
    }

    Ok(())
}

/// Assemble the API client from CLI flags (taking precedence) and the
/// config file, with the credential resolved last.
fn build_client(cli: &Cli, config: &Config) -> Result<DevOpsClient, Box<dyn std::error::Error>> {
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| config.server.base_url.clone())
        .ok_or("base URL is required (--base-url or [server].base_url in .pr-decorator.toml)")?;
    let project = cli
        .project
        .clone()
        .or_else(|| config.server.project.clone())
        .ok_or("project is required (--project or [server].project in .pr-decorator.toml)")?;
    let repository = cli
        .repository
        .clone()
        .or_else(|| config.server.repository.clone())
        .ok_or(
            "repository is required (--repository or [server].repository in .pr-decorator.toml)",
        )?;
    let token = config.auth_token().ok_or(client::ClientError::MissingToken)?;

    Ok(DevOpsClient::new(base_url, project, repository, token))
}

/// Use the explicit --pull-request id when given, otherwise fall back to
/// the id detected from the CI environment.
fn resolve_pull_request_id(explicit: Option<u32>) -> Result<u32, Box<dyn std::error::Error>> {
    if let Some(id) = explicit {
        return Ok(id);
    }
    let context = ci::detect();
    context
        .property(ci::PULL_REQUEST_KEY)
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| {
            "pull request id is required (--pull-request, or run inside a detected CI pipeline)"
                .into()
        })
}

fn parse_state(state: &str) -> Result<StatusState, String> {
    match state {
        "not-set" => Ok(StatusState::NotSet),
        "pending" => Ok(StatusState::Pending),
        "succeeded" => Ok(StatusState::Succeeded),
        "failed" => Ok(StatusState::Failed),
        "error" => Ok(StatusState::Error),
        other => Err(format!(
            "unknown status state '{other}' (expected one of: not-set, pending, succeeded, failed, error)"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_state_accepts_wire_states() {
        assert_eq!(parse_state("succeeded").unwrap(), StatusState::Succeeded);
        assert_eq!(parse_state("not-set").unwrap(), StatusState::NotSet);
        assert!(parse_state("SUCCEEDED").is_err());
        assert!(parse_state("done").is_err());
    }

    #[test]
    fn test_explicit_pull_request_id_wins() {
        assert_eq!(resolve_pull_request_id(Some(9)).unwrap(), 9);
    }
}
