//! Git access through an MCP git server spawned per request.

use std::path::Path;

use async_trait::async_trait;
use rmcp::ServiceExt;
use rmcp::model::CallToolRequestParam;
use rmcp::service::{RoleClient, RunningService};
use rmcp::transport::TokioChildProcess;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use crate::config::GitServerConfig;
use crate::error::GitError;
use crate::git::session::{Connector, ToolArguments, ToolSession};

/// Spawns the configured MCP git server with the repository path appended.
#[derive(Debug, Clone)]
pub struct McpConnector {
    command: String,
    args: Vec<String>,
}

impl McpConnector {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_config(config: &GitServerConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }
}

#[async_trait]
impl Connector for McpConnector {
    async fn connect(&self, repo: &Path) -> Result<Box<dyn ToolSession>, GitError> {
        let program = which::which(&self.command)
            .map_err(|_| GitError::ServerNotFound(self.command.clone()))?;

        let mut cmd = Command::new(program);
        cmd.args(&self.args).arg(repo);

        let connect_error = |reason: String| GitError::Connect {
            command: self.command.clone(),
            reason,
        };

        let transport = TokioChildProcess::new(cmd).map_err(|e| connect_error(e.to_string()))?;
        let service = ()
            .serve(transport)
            .await
            .map_err(|e| connect_error(e.to_string()))?;

        debug!("Connected to git server '{}' for {}", self.command, repo.display());

        Ok(Box::new(McpSession {
            service: Some(service),
        }))
    }
}

/// A running MCP client. Dropping it kills the child process.
struct McpSession {
    service: Option<RunningService<RoleClient, ()>>,
}

#[async_trait]
impl ToolSession for McpSession {
    async fn call_tool(
        &mut self,
        tool: &str,
        arguments: ToolArguments,
    ) -> Result<String, GitError> {
        let service = self.service.as_ref().ok_or(GitError::SessionClosed)?;

        debug!("Calling git tool {tool}");
        let result = service
            .call_tool(CallToolRequestParam {
                name: tool.to_string().into(),
                arguments: Some(arguments),
            })
            .await
            .map_err(|e| GitError::CallFailed {
                tool: tool.to_string(),
                reason: e.to_string(),
            })?;

        let value = serde_json::to_value(&result).map_err(|e| GitError::Malformed {
            tool: tool.to_string(),
            reason: e.to_string(),
        })?;

        tool_text(tool, &value)
    }

    async fn close(&mut self) -> Result<(), GitError> {
        match self.service.take() {
            Some(service) => service
                .cancel()
                .await
                .map(|_| ())
                .map_err(|e| GitError::CloseFailed(e.to_string())),
            None => Ok(()),
        }
    }
}

/// Extract the text payload of a serialized `CallToolResult`.
///
/// Text blocks are joined with newlines. A result flagged `isError` becomes
/// [`GitError::Remote`] carrying the text; a result with no `content` array
/// is malformed.
fn tool_text(tool: &str, result: &Value) -> Result<String, GitError> {
    let content = result
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| GitError::Malformed {
            tool: tool.to_string(),
            reason: "missing content array".to_string(),
        })?;

    let text = content
        .iter()
        .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("\n");

    if result.get("isError").and_then(Value::as_bool).unwrap_or(false) {
        return Err(GitError::Remote {
            tool: tool.to_string(),
            payload: text,
        });
    }

    Ok(text)
}
