//! Scoped sessions against a git-capable tool server.
//!
//! A [`Connector`] opens one [`ToolSession`] per logical request. Sessions
//! are never reused: [`with_repository`] opens, runs the caller's calls,
//! and closes before returning.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::GitError;
use crate::git::status::RepositoryStatus;

/// Arguments for a named tool call.
pub type ToolArguments = Map<String, Value>;

/// Future returned by the operation passed to [`with_repository`].
pub type SessionFuture<'s, T> = Pin<Box<dyn Future<Output = Result<T, GitError>> + Send + 's>>;

/// An open connection to a git tool server, scoped to one repository.
#[async_trait]
pub trait ToolSession: Send {
    /// Invoke a named tool and return its text payload.
    async fn call_tool(&mut self, tool: &str, arguments: ToolArguments)
    -> Result<String, GitError>;

    /// Machine-readable status, for backends that can provide one.
    async fn structured_status(&mut self) -> Result<Option<RepositoryStatus>, GitError> {
        Ok(None)
    }

    /// Release the connection. Called exactly once by [`with_repository`].
    async fn close(&mut self) -> Result<(), GitError>;
}

/// Opens sessions against a repository path.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, repo: &Path) -> Result<Box<dyn ToolSession>, GitError>;
}

/// Resolve a caller-supplied repository path; blank means the working directory.
pub fn resolve_repo_path(raw: Option<&str>) -> PathBuf {
    match raw.map(str::trim) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from("."),
    }
}

/// Build the `{ "repo_path": ... }` argument map shared by every git tool.
pub fn repo_arguments(repo: &Path) -> ToolArguments {
    let mut args = Map::new();
    args.insert(
        "repo_path".to_string(),
        Value::String(repo.to_string_lossy().into_owned()),
    );
    args
}

/// Open a session on `repo`, run `operation`, and close the session.
///
/// The session is closed exactly once whether `operation` succeeds or fails.
/// A close failure is logged and never replaces the operation's result.
pub async fn with_repository<T, F>(
    connector: &dyn Connector,
    repo: &Path,
    operation: F,
) -> Result<T, GitError>
where
    T: Send,
    F: for<'s> FnOnce(&'s mut dyn ToolSession) -> SessionFuture<'s, T>,
{
    debug!("Opening git session for {}", repo.display());
    let mut session = connector.connect(repo).await?;

    let result = operation(session.as_mut()).await;

    if let Err(e) = session.close().await {
        match &result {
            Ok(_) => warn!("Failed to close git session for {}: {e}", repo.display()),
            Err(op_err) => debug!(
                "Failed to close git session after error ({op_err}): {e}"
            ),
        }
    }

    result
}
