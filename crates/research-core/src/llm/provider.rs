//! Chat provider trait
//!
//! The analysis engine only needs "send messages, get text back", so the
//! backend contract is a single call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One role-tagged turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A language model backend
///
/// # Example Implementation
///
/// ```rust,ignore
/// struct Canned;
///
/// #[async_trait]
/// impl ChatProvider for Canned {
///     async fn chat(&self, _: &[ChatMessage], _: Option<&str>) -> Result<String, LlmError> {
///         Ok("{}".to_string())
///     }
///     fn name(&self) -> &str { "canned" }
///     fn model(&self) -> &str { "canned-v1" }
/// }
/// ```
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send `messages` (oldest first) with an optional system instruction
    /// and return the raw response text.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<String, LlmError>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model identifier
    fn model(&self) -> &str;
}

/// Flatten a conversation into a single prompt.
///
/// A lone message is sent as-is; longer conversations are rendered as a
/// role-labelled transcript.
pub(crate) fn render_prompt(messages: &[ChatMessage]) -> String {
    match messages {
        [] => String::new(),
        [only] => only.content.clone(),
        many => many
            .iter()
            .map(|m| match m.role {
                ChatRole::User => format!("User: {}", m.content),
                ChatRole::Assistant => format!("Assistant: {}", m.content),
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_message() {
        assert_eq!(render_prompt(&[ChatMessage::user("hello")]), "hello");
        assert_eq!(render_prompt(&[]), "");
    }

    #[test]
    fn test_render_transcript() {
        let messages = vec![
            ChatMessage::user("Hi"),
            ChatMessage::assistant("Hello"),
            ChatMessage::user("Summarize"),
        ];

        assert_eq!(
            render_prompt(&messages),
            "User: Hi\n\nAssistant: Hello\n\nUser: Summarize"
        );
    }
}
