//! The text-generation capability shared by every LLM provider.

use std::fmt;

use async_trait::async_trait;

use crate::error::ProviderError;

/// Supported LLM providers, listed in failover order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Groq,
    OpenAi,
    Anthropic,
}

impl Provider {
    /// Every provider in the order they are tried.
    pub const PRIORITY: [Provider; 3] = [Provider::Groq, Provider::OpenAi, Provider::Anthropic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Groq => "Groq",
            Provider::OpenAi => "OpenAI",
            Provider::Anthropic => "Anthropic",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn key_env_var(&self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generates text from a system instruction and a user prompt.
///
/// This abstraction allows mocking provider calls in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextProvider: Send + Sync {
    fn provider(&self) -> Provider;

    async fn generate(&self, system: &str, prompt: &str) -> Result<String, ProviderError>;
}
