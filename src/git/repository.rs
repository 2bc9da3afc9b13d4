//! Repository operations: status, staged diff, and commit.
//!
//! Each call is one logical request and therefore one session.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::{Backend, GitServerConfig};
use crate::error::GitError;
use crate::git::local::LocalConnector;
use crate::git::mcp::McpConnector;
use crate::git::session::{Connector, repo_arguments, with_repository};
use crate::git::status::{RepositoryStatus, StatusParser};

/// Output reported when the server confirms a commit without any text.
pub const DEFAULT_COMMIT_OUTPUT: &str = "Commit successful";

/// Raw diff text plus the raw changed-file listing it was drafted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffPayload {
    pub diff: String,
    pub files: String,
}

impl DiffPayload {
    /// Whether there is nothing to draft a message from.
    pub fn is_empty(&self) -> bool {
        self.diff.trim().is_empty()
    }
}

/// Git operations over a [`Connector`].
#[derive(Clone)]
pub struct GitRepository {
    connector: Arc<dyn Connector>,
    parser: StatusParser,
}

impl GitRepository {
    pub fn new(connector: Arc<dyn Connector>, parser: StatusParser) -> Self {
        Self { connector, parser }
    }

    /// Build the backend selected in configuration.
    pub fn from_config(config: &GitServerConfig) -> Self {
        let connector: Arc<dyn Connector> = match config.backend {
            Backend::Mcp => Arc::new(McpConnector::from_config(config)),
            Backend::Local => Arc::new(LocalConnector),
        };
        Self::new(connector, config.status_parser)
    }

    /// Branch and categorized files of the working tree at `repo`.
    ///
    /// Uses the backend's structured status when it has one, otherwise
    /// interprets the `git_status` text.
    pub async fn status(&self, repo: &Path) -> Result<RepositoryStatus, GitError> {
        let parser = self.parser;
        let args = repo_arguments(repo);

        with_repository(self.connector.as_ref(), repo, move |session| {
            Box::pin(async move {
                if let Some(status) = session.structured_status().await? {
                    return Ok(status);
                }

                let status_text = session.call_tool("git_status", args.clone()).await?;

                let mut log_args = args;
                log_args.insert("max_count".to_string(), Value::from(1));
                let log_text = session.call_tool("git_log", log_args).await?;

                Ok(parser.parse(&status_text, &log_text))
            })
        })
        .await
    }

    /// Staged diff and the status listing of changed files.
    ///
    /// Falls back to the unstaged diff when the server rejects
    /// `git_diff_staged`, either with an error result or a failed call.
    pub async fn diff_and_files(&self, repo: &Path) -> Result<DiffPayload, GitError> {
        let args = repo_arguments(repo);

        with_repository(self.connector.as_ref(), repo, move |session| {
            Box::pin(async move {
                let diff = match session.call_tool("git_diff_staged", args.clone()).await {
                    Ok(diff) => diff,
                    Err(
                        e @ (GitError::Remote { .. }
                        | GitError::UnknownTool(_)
                        | GitError::CallFailed { .. }),
                    ) => {
                        debug!("git_diff_staged unavailable ({e}), using git_diff_unstaged");
                        session.call_tool("git_diff_unstaged", args.clone()).await?
                    }
                    Err(e) => return Err(e),
                };

                let files = session.call_tool("git_status", args).await?;

                Ok(DiffPayload { diff, files })
            })
        })
        .await
    }

    /// Commit the staged changes with `message`.
    ///
    /// A blank message is rejected before any connection is opened.
    pub async fn commit(&self, repo: &Path, message: &str) -> Result<String, GitError> {
        if message.trim().is_empty() {
            return Err(GitError::EmptyMessage);
        }

        let mut args = repo_arguments(repo);
        args.insert("message".to_string(), Value::from(message));

        let output = with_repository(self.connector.as_ref(), repo, move |session| {
            Box::pin(async move { session.call_tool("git_commit", args).await })
        })
        .await?;

        info!("Committed changes in {}", repo.display());

        if output.trim().is_empty() {
            Ok(DEFAULT_COMMIT_OUTPUT.to_string())
        } else {
            Ok(output)
        }
    }
}
