//! commit-assist - CLI entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use commit_assist::commit::draft_commit_message;
use commit_assist::git::resolve_repo_path;
use commit_assist::server;
use commit_assist::{AppState, Config, ConfigArgs, GitRepository, LlmRouter};

/// Draft and commit conventional commit messages with LLM help.
#[derive(Parser, Debug)]
#[command(name = "commit-assist")]
#[command(about = "Draft commit messages from staged changes using LLM providers")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Address the web UI listens on
    #[arg(
        long,
        env = "COMMIT_ASSIST_BIND",
        default_value = "127.0.0.1:3000",
        global = true
    )]
    bind: SocketAddr,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web UI and JSON API (default)
    Serve,
    /// Print branch and categorized files as JSON
    Status {
        /// Repository path (defaults to the current directory)
        repo: Option<String>,
    },
    /// Draft a commit message for the staged changes
    Draft {
        /// Repository path (defaults to the current directory)
        repo: Option<String>,
    },
    /// Commit staged changes with a message
    Commit {
        /// Repository path (defaults to the current directory)
        repo: Option<String>,

        /// Commit message
        #[arg(short, long)]
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("commit_assist=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_args(cli.config).context("Invalid configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let bind = cli.bind;
            let state = Arc::new(AppState::from_config(&config));
            let listener = TcpListener::bind(bind)
                .await
                .with_context(|| format!("Failed to bind {bind}"))?;
            server::serve(listener, state)
                .await
                .context("Server error")?;
        }
        Command::Status { repo } => {
            let git = GitRepository::from_config(&config.git);
            let status = git
                .status(&resolve_repo_path(repo.as_deref()))
                .await
                .context("Failed to get git status. Make sure you are in a git repository.")?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Draft { repo } => {
            let git = GitRepository::from_config(&config.git);
            let payload = git
                .diff_and_files(&resolve_repo_path(repo.as_deref()))
                .await
                .context("Failed to read staged changes")?;
            if payload.is_empty() {
                bail!("No staged changes found. Please stage your changes first.");
            }

            let router = LlmRouter::from_settings(&config.providers);
            match draft_commit_message(&router, &payload.diff, &payload.files).await {
                Ok(message) => println!("{message}"),
                Err(e) => {
                    tracing::warn!("{}", e.detailed());
                    bail!("{}", e.summary());
                }
            }
        }
        Command::Commit { repo, message } => {
            let git = GitRepository::from_config(&config.git);
            let output = git
                .commit(&resolve_repo_path(repo.as_deref()), &message)
                .await
                .context("Failed to commit changes. Make sure you have staged changes.")?;
            println!("{output}");
        }
    }

    Ok(())
}
