//! Git access through a tool session.
//!
//! The default backend drives an MCP git server over stdio; the local
//! backend answers the same tool calls in-process with git2.

pub mod local;
pub mod mcp;
pub mod repository;
pub mod session;
pub mod status;

pub use local::LocalConnector;
pub use mcp::McpConnector;
pub use repository::{DEFAULT_COMMIT_OUTPUT, DiffPayload, GitRepository};
pub use session::{Connector, ToolSession, resolve_repo_path, with_repository};
pub use status::{RepositoryStatus, StatusParser};
