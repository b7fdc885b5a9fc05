//! Anthropic (Claude) chat backend via Rig

use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::anthropic::Client;

use super::config::LlmSettings;
use super::provider::{render_prompt, ChatMessage, ChatProvider};
use crate::error::LlmError;

/// Claude through rig-core's Anthropic client.
///
/// Anthropic requires `max_tokens` on every request; it always comes from
/// [`LlmSettings::max_tokens`].
pub struct AnthropicChat {
    client: Client,
    model: String,
    temperature: f64,
    max_tokens: u64,
}

impl AnthropicChat {
    pub fn new(api_key: impl Into<String>, settings: &LlmSettings) -> Self {
        let api_key: String = api_key.into();
        Self {
            client: Client::from_val(api_key.into()),
            model: settings.effective_model().to_string(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

#[async_trait]
impl ChatProvider for AnthropicChat {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<String, LlmError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(system_prompt.unwrap_or_default())
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build();

        let prompt = render_prompt(messages);

        agent
            .prompt(&prompt)
            .await
            .map_err(|e| LlmError::request(self.name(), e.to_string()))
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ProviderKind;

    #[test]
    fn test_anthropic_chat_defaults() {
        let provider = AnthropicChat::new("test-key", &LlmSettings::new(ProviderKind::Anthropic));

        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.model(), "claude-3-opus-20240229");
        assert_eq!(provider.max_tokens, 4000);
    }
}
