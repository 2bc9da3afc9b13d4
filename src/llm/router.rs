//! Provider failover orchestration.
//!
//! Providers are tried one after another in a fixed order. The first
//! non-empty answer wins; errors, empty answers and timeouts are logged and
//! the next provider is tried.

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::ProviderSettings;
use crate::error::ProviderError;
use crate::llm::anthropic::AnthropicClient;
use crate::llm::openai_compat::OpenAiCompatClient;
use crate::llm::provider::{Provider, TextProvider};

/// Remediation shown to users when no provider could answer.
pub static NO_PROVIDER_GUIDANCE: LazyLock<String> = LazyLock::new(|| {
    let vars: Vec<&str> = Provider::PRIORITY.iter().map(Provider::key_env_var).collect();
    let listed = match vars.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, or {last}", rest.join(", ")),
        _ => vars.concat(),
    };
    format!("No LLM API key configured. Please set {listed} in .env")
});

/// One provider attempt that did not produce a message.
#[derive(Debug)]
pub struct ProviderFailure {
    pub provider: Provider,
    pub error: ProviderError,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

/// LLM orchestration error.
#[derive(Debug)]
pub enum LlmError {
    /// No provider credential is configured; nothing was called.
    NoProviderConfigured,
    /// Every configured provider failed or answered with nothing.
    AllProvidersFailed { failures: Vec<ProviderFailure> },
}

impl LlmError {
    /// User-facing message with remediation guidance, free of provider detail.
    pub fn summary(&self) -> String {
        match self {
            LlmError::NoProviderConfigured => NO_PROVIDER_GUIDANCE.to_string(),
            LlmError::AllProvidersFailed { .. } => {
                format!("All configured LLM providers failed. {}", *NO_PROVIDER_GUIDANCE)
            }
        }
    }

    /// Per-provider detail for logs.
    pub fn detailed(&self) -> String {
        match self {
            LlmError::NoProviderConfigured => "No LLM provider credential configured".to_string(),
            LlmError::AllProvidersFailed { failures } => {
                let detail = failures
                    .iter()
                    .map(ProviderFailure::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                format!("All configured LLM providers failed. {detail}")
            }
        }
    }

    pub fn failures(&self) -> &[ProviderFailure] {
        match self {
            LlmError::NoProviderConfigured => &[],
            LlmError::AllProvidersFailed { failures } => failures,
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for LlmError {}

/// Successful generation with the provider that produced it.
#[derive(Debug)]
pub struct LlmCompletion {
    pub output: String,
    pub provider: Provider,
    /// Providers tried before the successful one.
    pub skipped: Vec<ProviderFailure>,
}

/// Ordered provider list with first-success-wins semantics.
pub struct LlmRouter {
    providers: Vec<Box<dyn TextProvider>>,
    timeout: Duration,
}

impl LlmRouter {
    pub fn new(providers: Vec<Box<dyn TextProvider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// Build HTTP clients for every configured provider, keeping their order.
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        let providers = settings
            .providers
            .iter()
            .map(|config| -> Box<dyn TextProvider> {
                match config.provider {
                    Provider::Groq | Provider::OpenAi => {
                        Box::new(OpenAiCompatClient::from_config(config))
                    }
                    Provider::Anthropic => Box::new(AnthropicClient::from_config(config)),
                }
            })
            .collect();
        Self::new(providers, settings.timeout)
    }

    /// Providers in the order they will be tried.
    pub fn providers(&self) -> Vec<Provider> {
        self.providers.iter().map(|p| p.provider()).collect()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask each provider in turn until one returns a non-empty message.
    pub async fn generate(&self, system: &str, prompt: &str) -> Result<LlmCompletion, LlmError> {
        if self.providers.is_empty() {
            return Err(LlmError::NoProviderConfigured);
        }

        let mut failures = Vec::new();

        for candidate in &self.providers {
            let provider = candidate.provider();
            debug!("Requesting completion from {provider}");

            let attempt = match timeout(self.timeout, candidate.generate(system, prompt)).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(self.timeout.as_secs())),
            };

            let error = match attempt {
                Ok(output) if !output.trim().is_empty() => {
                    return Ok(LlmCompletion {
                        output: output.trim().to_string(),
                        provider,
                        skipped: failures,
                    });
                }
                Ok(_) => ProviderError::EmptyResponse,
                Err(error) => error,
            };

            warn!("{provider} failed, trying next provider: {error}");
            failures.push(ProviderFailure { provider, error });
        }

        Err(LlmError::AllProvidersFailed { failures })
    }
}
