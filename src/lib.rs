//! commit-assist - A local assistant that drafts commit messages from staged changes.
//!
//! # Overview
//!
//! commit-assist reads repository state through a git tool server (an MCP server
//! spawned per request, or libgit2 in-process), asks LLM providers in a fixed
//! failover order for a conventional commit message, and commits the reviewed
//! message. It is served as a small local web app and as CLI subcommands.

pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod server;

// Re-export commonly used types
pub use config::{Backend, Config, ConfigArgs};
pub use error::{ConfigError, GitError, ProviderError};
pub use git::{DiffPayload, GitRepository, RepositoryStatus, StatusParser};
pub use llm::{LlmError, LlmRouter, Provider};
pub use server::AppState;
