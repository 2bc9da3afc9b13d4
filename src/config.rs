//! Startup configuration.
//!
//! Everything is read once (command line, environment, `.env`) into an
//! immutable [`Config`] that is passed explicitly to the git and LLM layers.

use std::time::Duration;

use clap::{Args, ValueEnum};
use secrecy::SecretString;

use crate::error::ConfigError;
use crate::git::status::StatusParser;
use crate::llm::Provider;

/// Default timeout for a single provider attempt.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

pub const GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const OPENAI_MODEL: &str = "gpt-4o-mini";
pub const ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Which git backend serves requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Backend {
    /// Spawn the MCP git server per request.
    #[default]
    Mcp,
    /// Read the repository in-process with libgit2.
    Local,
}

/// Command-line and environment options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Program that starts the MCP git server
    #[arg(
        long,
        env = "COMMIT_ASSIST_GIT_SERVER",
        default_value = "npx",
        global = true
    )]
    pub git_server_command: String,

    /// Arguments for the git server; the repository path is appended
    #[arg(
        long = "git-server-arg",
        env = "COMMIT_ASSIST_GIT_SERVER_ARGS",
        value_delimiter = ' ',
        allow_hyphen_values = true,
        default_values = ["-y", "@modelcontextprotocol/server-git"],
        global = true
    )]
    pub git_server_args: Vec<String>,

    /// Git backend
    #[arg(long, env = "COMMIT_ASSIST_BACKEND", value_enum, default_value_t = Backend::Mcp, global = true)]
    pub backend: Backend,

    /// How `git status` text is classified
    #[arg(long, value_enum, default_value_t = StatusParser::Sectioned, global = true)]
    pub status_parser: StatusParser,

    /// Seconds allowed for each provider attempt
    #[arg(
        long,
        env = "COMMIT_ASSIST_PROVIDER_TIMEOUT",
        default_value_t = DEFAULT_PROVIDER_TIMEOUT_SECS,
        global = true
    )]
    pub provider_timeout_secs: u64,

    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true, hide = true)]
    pub groq_api_key: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, hide = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true, hide = true)]
    pub anthropic_api_key: Option<String>,

    #[arg(long, env = "GROQ_MODEL", default_value = GROQ_MODEL, hide = true)]
    pub groq_model: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = OPENAI_MODEL, hide = true)]
    pub openai_model: String,

    #[arg(long, env = "ANTHROPIC_MODEL", default_value = ANTHROPIC_MODEL, hide = true)]
    pub anthropic_model: String,

    #[arg(long, env = "GROQ_BASE_URL", default_value = GROQ_BASE_URL, hide = true)]
    pub groq_base_url: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = OPENAI_BASE_URL, hide = true)]
    pub openai_base_url: String,

    #[arg(long, env = "ANTHROPIC_BASE_URL", default_value = ANTHROPIC_BASE_URL, hide = true)]
    pub anthropic_base_url: String,
}

/// How to reach the git tool server.
#[derive(Debug, Clone)]
pub struct GitServerConfig {
    pub command: String,
    pub args: Vec<String>,
    pub backend: Backend,
    pub status_parser: StatusParser,
}

impl Default for GitServerConfig {
    fn default() -> Self {
        Self {
            command: "npx".to_string(),
            args: vec![
                "-y".to_string(),
                "@modelcontextprotocol/server-git".to_string(),
            ],
            backend: Backend::default(),
            status_parser: StatusParser::default(),
        }
    }
}

/// Credential and endpoint for one configured provider.
#[derive(Debug)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
}

/// Configured providers, in failover order, plus the per-attempt timeout.
#[derive(Debug)]
pub struct ProviderSettings {
    pub providers: Vec<ProviderConfig>,
    pub timeout: Duration,
}

/// Immutable process-wide configuration.
#[derive(Debug)]
pub struct Config {
    pub git: GitServerConfig,
    pub providers: ProviderSettings,
}

impl Config {
    /// Resolve parsed arguments into a [`Config`].
    ///
    /// Providers whose key is missing or blank are left out; the order is
    /// always Groq, OpenAI, Anthropic.
    pub fn from_args(args: ConfigArgs) -> Result<Self, ConfigError> {
        if args.git_server_command.trim().is_empty() {
            return Err(ConfigError::EmptyServerCommand);
        }
        if args.provider_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let candidates = [
            (
                Provider::Groq,
                args.groq_api_key,
                args.groq_model,
                args.groq_base_url,
            ),
            (
                Provider::OpenAi,
                args.openai_api_key,
                args.openai_model,
                args.openai_base_url,
            ),
            (
                Provider::Anthropic,
                args.anthropic_api_key,
                args.anthropic_model,
                args.anthropic_base_url,
            ),
        ];

        let providers = candidates
            .into_iter()
            .filter_map(|(provider, key, model, base_url)| {
                let key = key.filter(|k| !k.trim().is_empty())?;
                Some(ProviderConfig {
                    provider,
                    api_key: SecretString::from(key),
                    model,
                    base_url,
                })
            })
            .collect();

        Ok(Self {
            git: GitServerConfig {
                command: args.git_server_command,
                args: args
                    .git_server_args
                    .into_iter()
                    .filter(|a| !a.is_empty())
                    .collect(),
                backend: args.backend,
                status_parser: args.status_parser,
            },
            providers: ProviderSettings {
                providers,
                timeout: Duration::from_secs(args.provider_timeout_secs),
            },
        })
    }
}
