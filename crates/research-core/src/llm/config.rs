//! LLM backend selection and sampling settings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which model backend to talk to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    DeepSeek,
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::DeepSeek => "deepseek-chat",
            ProviderKind::OpenAi => "gpt-4-turbo-preview",
            ProviderKind::Anthropic => "claude-3-opus-20240229",
        }
    }

    /// Environment variable conventionally holding this backend's key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::DeepSeek => "DEEPSEEK_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deepseek" => Ok(ProviderKind::DeepSeek),
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            other => Err(format!(
                "unknown AI provider '{}', expected one of: deepseek, openai, anthropic",
                other
            )),
        }
    }
}

/// Settings for the model backend
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmSettings {
    pub provider: ProviderKind,
    /// Overrides the provider's default model
    pub model: Option<String>,
    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f64,
    /// Maximum tokens to generate per response
    pub max_tokens: u64,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Endpoint override; only the DeepSeek backend honours it
    pub base_url: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: None,
            temperature: 0.7,
            max_tokens: 4000,
            api_key: None,
            base_url: None,
        }
    }
}

impl LlmSettings {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, tokens: u64) -> Self {
        self.max_tokens = tokens;
        self
    }

    /// Base URL override, ignoring blank values
    pub fn effective_base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Configured model, or the provider default
    pub fn effective_model(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_model())
    }
}
