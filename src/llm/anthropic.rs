//! Anthropic Messages API client.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::llm::openai_compat::MAX_TOKENS;
use crate::llm::provider::{Provider, TextProvider};

pub const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<UserMessage>,
}

#[derive(Debug, Serialize)]
struct UserMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

pub struct AnthropicClient {
    client: Client,
    api_key: SecretString,
    model: String,
    endpoint: String,
}

impl AnthropicClient {
    pub fn new(api_key: SecretString, model: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.to_string(),
            endpoint: format!("{}/v1/messages", base_url.trim_end_matches('/')),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(
            SecretString::from(config.api_key.expose_secret().to_string()),
            &config.model,
            &config.base_url,
        )
    }
}

#[async_trait]
impl TextProvider for AnthropicClient {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    /// The system instruction travels inside the single user turn.
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, ProviderError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![UserMessage {
                role: "user",
                content: format!("{system}\n\n{prompt}"),
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        first_text(parsed).ok_or(ProviderError::EmptyResponse)
    }
}

fn first_text(response: MessagesResponse) -> Option<String> {
    response
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
}
