//! Error types for commit-assist modules using thiserror.

use thiserror::Error;

/// Errors from git access, whichever backend serves the request.
///
/// At the contract level every variant means "the git operation failed";
/// the variants exist so logs carry the original cause.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git server command '{0}' not found on PATH")]
    ServerNotFound(String),

    #[error("Failed to connect to git server '{command}': {reason}")]
    Connect { command: String, reason: String },

    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Git tool '{tool}' reported an error: {payload}")]
    Remote { tool: String, payload: String },

    #[error("Git tool '{tool}' call failed: {reason}")]
    CallFailed { tool: String, reason: String },

    #[error("Git tool '{tool}' returned a malformed result: {reason}")]
    Malformed { tool: String, reason: String },

    #[error("Unknown git tool: {0}")]
    UnknownTool(String),

    #[error("Git session is already closed")]
    SessionClosed,

    #[error("Failed to close git session: {0}")]
    CloseFailed(String),

    #[error("Commit message is required")]
    EmptyMessage,

    #[error("Nothing to commit (no staged changes)")]
    NothingToCommit,

    #[error("Git config error (missing user.name or user.email): {0}")]
    Signature(#[source] git2::Error),

    #[error("Local git operation failed: {0}")]
    Local(#[source] git2::Error),
}

impl GitError {
    /// Whether the git service could not be reached at all.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            GitError::ServerNotFound(_) | GitError::Connect { .. } | GitError::OpenRepository(_)
        )
    }

    /// Whether the failure was detected before any external call was made.
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, GitError::EmptyMessage)
    }
}

/// Errors from a single text-generation provider attempt.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected response shape: {0}")]
    InvalidResponse(String),

    #[error("Provider returned an empty message")]
    EmptyResponse,

    #[error("Provider timed out after {0} seconds")]
    Timeout(u64),
}

/// Errors from resolving startup configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Git server command must not be empty")]
    EmptyServerCommand,

    #[error("Provider timeout must be at least 1 second")]
    ZeroTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_failures_are_classified() {
        assert!(GitError::ServerNotFound("npx".into()).is_connection_failure());
        assert!(
            GitError::Connect {
                command: "npx".into(),
                reason: "broken pipe".into()
            }
            .is_connection_failure()
        );
        assert!(
            !GitError::Remote {
                tool: "git_status".into(),
                payload: "not a git repository".into()
            }
            .is_connection_failure()
        );
    }

    #[test]
    fn remote_error_carries_payload() {
        let err = GitError::Remote {
            tool: "git_commit".into(),
            payload: "nothing added to commit".into(),
        };
        let text = err.to_string();
        assert!(text.contains("git_commit"));
        assert!(text.contains("nothing added to commit"));
    }

    #[test]
    fn empty_message_is_validation_failure() {
        assert!(GitError::EmptyMessage.is_validation_failure());
        assert!(!GitError::NothingToCommit.is_validation_failure());
    }

    #[test]
    fn provider_api_error_display() {
        let err = ProviderError::Api {
            status: 429,
            body: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "API returned status 429: rate limited");
    }
}
