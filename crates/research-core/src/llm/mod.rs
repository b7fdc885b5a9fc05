//! Language model backends
//!
//! The engine talks to models through the [`ChatProvider`] trait. Concrete
//! backends wrap rig-core clients:
//!
//! - [`DeepSeekChat`] (default)
//! - [`OpenAiChat`]
//! - [`AnthropicChat`]
//!
//! [`build_provider`] picks one from [`LlmSettings`].

pub mod anthropic;
pub mod config;
pub mod deepseek;
pub mod openai;
pub mod provider;

use std::sync::Arc;
use tracing::info;

use crate::error::ResearchError;

pub use anthropic::AnthropicChat;
pub use config::{LlmSettings, ProviderKind};
pub use deepseek::DeepSeekChat;
pub use openai::OpenAiChat;
pub use provider::{ChatMessage, ChatProvider, ChatRole};

/// Build the backend selected by `settings`.
///
/// Fails fast when no API key is configured, before any network traffic.
pub fn build_provider(settings: &LlmSettings) -> Result<Arc<dyn ChatProvider>, ResearchError> {
    let provider = settings.provider;
    let api_key = settings
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            ResearchError::Configuration(format!(
                "missing API key for {} ({} is not set)",
                provider,
                provider.api_key_env()
            ))
        })?;

    info!(
        provider = %provider,
        model = %settings.effective_model(),
        base_url = settings.effective_base_url().unwrap_or("default"),
        "Initializing LLM provider"
    );

    let backend: Arc<dyn ChatProvider> = match provider {
        ProviderKind::DeepSeek => match settings.effective_base_url() {
            Some(url) => Arc::new(DeepSeekChat::with_base_url(api_key, url, settings)?),
            None => Arc::new(DeepSeekChat::new(api_key, settings)),
        },
        ProviderKind::OpenAi => Arc::new(OpenAiChat::new(api_key, settings)),
        ProviderKind::Anthropic => Arc::new(AnthropicChat::new(api_key, settings)),
    };

    Ok(backend)
}
