//! DeepSeek chat backend via Rig

use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::deepseek::Client;

use super::config::LlmSettings;
use super::provider::{render_prompt, ChatMessage, ChatProvider};
use crate::error::{LlmError, ResearchError};

/// DeepSeek through rig-core's DeepSeek client (OpenAI-compatible API)
pub struct DeepSeekChat {
    client: Client,
    model: String,
    temperature: f64,
    max_tokens: u64,
}

impl DeepSeekChat {
    /// Client for DeepSeek's public endpoint
    pub fn new(api_key: impl Into<String>, settings: &LlmSettings) -> Self {
        let api_key: String = api_key.into();
        Self::with_client(Client::from_val(api_key.into()), settings)
    }

    /// Client for a custom endpoint such as an OpenAI-compatible gateway
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: &str,
        settings: &LlmSettings,
    ) -> Result<Self, ResearchError> {
        let api_key: String = api_key.into();
        let client = Client::builder()
            .api_key(api_key)
            .base_url(base_url)
            .build()
            .map_err(|e| {
                ResearchError::Configuration(format!(
                    "failed to build DeepSeek client for {}: {}",
                    base_url, e
                ))
            })?;

        Ok(Self::with_client(client, settings))
    }

    fn with_client(client: Client, settings: &LlmSettings) -> Self {
        Self {
            client,
            model: settings.effective_model().to_string(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

#[async_trait]
impl ChatProvider for DeepSeekChat {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<String, LlmError> {
        let mut agent_builder = self
            .client
            .agent(&self.model)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);

        if let Some(preamble) = system_prompt {
            agent_builder = agent_builder.preamble(preamble);
        }

        let prompt = render_prompt(messages);

        agent_builder
            .build()
            .prompt(&prompt)
            .await
            .map_err(|e| LlmError::request(self.name(), e.to_string()))
    }

    fn name(&self) -> &str {
        "deepseek"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
