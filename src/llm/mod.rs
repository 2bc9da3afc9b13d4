//! LLM providers and failover routing.

pub mod anthropic;
pub mod openai_compat;
pub mod provider;
pub mod router;

pub use anthropic::AnthropicClient;
pub use openai_compat::OpenAiCompatClient;
pub use provider::{Provider, TextProvider};
pub use router::{LlmCompletion, LlmError, LlmRouter, NO_PROVIDER_GUIDANCE, ProviderFailure};
