//! OpenAI chat backend via Rig

use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::openai::Client;

use super::config::LlmSettings;
use super::provider::{render_prompt, ChatMessage, ChatProvider};
use crate::error::LlmError;

/// OpenAI chat completions through rig-core's OpenAI client
pub struct OpenAiChat {
    client: Client,
    model: String,
    temperature: f64,
    max_tokens: u64,
}

impl OpenAiChat {
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
impl ChatProvider for OpenAiChat {
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

        let agent = agent_builder.build();
        let prompt = render_prompt(messages);

        agent
            .prompt(&prompt)
            .await
            .map_err(|e| LlmError::request(self.name(), e.to_string()))
    }

    fn name(&self) -> &str {
        "openai"
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
    fn test_openai_chat_uses_settings() {
        let settings = LlmSettings::new(ProviderKind::OpenAi).with_model("gpt-4.1");
        let provider = OpenAiChat::new("test-key", &settings);

        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model(), "gpt-4.1");
    }

    #[tokio::test]
    #[ignore] // Requires OPENAI_API_KEY environment variable
    async fn test_openai_chat_live() {
        let key = std::env::var("OPENAI_API_KEY").unwrap();
        let provider = OpenAiChat::new(key, &LlmSettings::new(ProviderKind::OpenAi));

        let response = provider
            .chat(&[ChatMessage::user("Say 'hello' and nothing else.")], None)
            .await
            .unwrap();

        assert!(response.to_lowercase().contains("hello"));
    }
}
