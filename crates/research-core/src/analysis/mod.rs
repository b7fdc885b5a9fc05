//! Language-model analysis of research rounds
//!
//! [`AnalysisEngine`] turns search results and page text into structured
//! findings, proposes follow-up queries and writes the final report. Model
//! output that fails to parse is recovered locally; only a failed model call
//! is reported as an error, and `synthesize` absorbs even that.

pub mod parse;
pub mod prompts;

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::ResearchSettings;
use crate::error::{LlmError, ResearchError};
use crate::llm::{build_provider, ChatMessage, ChatProvider, LlmSettings};
use crate::research::state::{collect_sources, AnalysisResult, ContentMap, ResearchRound};
use crate::search::SearchRecord;

use parse::{
    append_references, fallback_report, has_references_heading, parse_analysis, parse_queries,
    MAX_FOLLOW_UP_QUERIES,
};
use prompts::AnalysisPrompts;

/// Model-backed analysis operations
pub struct AnalysisEngine {
    provider: Arc<dyn ChatProvider>,
    timeout: Duration,
}

impl AnalysisEngine {
    pub fn new(provider: Arc<dyn ChatProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Build the engine with the backend selected by `llm`.
    ///
    /// Fails with [`ResearchError::Configuration`] when no API key is set.
    pub fn from_settings(
        llm: &LlmSettings,
        settings: &ResearchSettings,
    ) -> Result<Self, ResearchError> {
        let provider = build_provider(llm)?;
        Ok(Self::new(provider, settings.llm_timeout))
    }

    pub fn provider(&self) -> &dyn ChatProvider {
        self.provider.as_ref()
    }

    /// Bound on each model call
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// One bounded model call
    async fn call(&self, system_prompt: &str, user_message: String) -> Result<String, LlmError> {
        let messages = [ChatMessage::user(user_message)];
        let response = tokio::time::timeout(
            self.timeout,
            self.provider.chat(&messages, Some(system_prompt)),
        )
        .await;

        match response {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.timeout.as_secs())),
        }
    }

    /// Extract findings from one round's search results and page samples.
    ///
    /// Always yields a complete [`AnalysisResult`] when the model answers,
    /// even if the answer is not JSON.
    pub async fn analyze(
        &self,
        query: &str,
        results: &[SearchRecord],
        contents: &ContentMap,
    ) -> Result<AnalysisResult, ResearchError> {
        info!(
            query = %query,
            results = results.len(),
            pages = contents.len(),
            provider = %self.provider.name(),
            "Analyzing search results"
        );

        let prompt = AnalysisPrompts::analysis(query, results, contents);
        let response = self.call(AnalysisPrompts::analyst_system(), prompt).await?;

        let analysis = parse_analysis(&response);
        info!(
            findings = analysis.key_findings.len(),
            gaps = analysis.gaps.len(),
            "Analysis complete"
        );
        Ok(analysis)
    }

    /// Propose up to three queries for round `round_index + 1`.
    ///
    /// An unparseable answer falls back to the analysis gaps themselves.
    pub async fn generate_follow_up_queries(
        &self,
        topic: &str,
        previous: &AnalysisResult,
        round_index: usize,
    ) -> Result<Vec<String>, ResearchError> {
        info!(round = round_index + 1, "Generating follow-up queries");

        let prompt = AnalysisPrompts::follow_up(topic, previous);
        let response = self.call(AnalysisPrompts::strategist_system(), prompt).await?;

        let queries = match parse_queries(&response) {
            Some(queries) => queries,
            None => {
                warn!("Could not parse follow-up queries, using analysis gaps");
                previous
                    .gaps
                    .iter()
                    .take(MAX_FOLLOW_UP_QUERIES)
                    .cloned()
                    .collect()
            }
        };

        info!(count = queries.len(), "Follow-up queries ready");
        Ok(queries)
    }

    /// Write the final Markdown report.
    ///
    /// The result always ends up with a references section when the model
    /// omits one. A failed model call yields a plain per-round summary
    /// with the reference list instead of an error.
    pub async fn synthesize(&self, topic: &str, rounds: &[ResearchRound]) -> String {
        info!(topic = %topic, rounds = rounds.len(), "Synthesizing research report");

        let sources = collect_sources(rounds);
        let prompt = AnalysisPrompts::synthesis(topic, rounds);

        let report = match self.call(AnalysisPrompts::writer_system(), prompt).await {
            Ok(mut report) => {
                if !has_references_heading(&report) {
                    append_references(&mut report, &sources);
                }
                report
            }
            Err(e) => {
                error!(error = %e, "Report generation failed, using round summaries");
                let mut report = fallback_report(topic, rounds);
                append_references(&mut report, &sources);
                report
            }
        };

        info!(chars = report.len(), sources = sources.len(), "Report ready");
        report
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted reply for one model call
    pub enum Reply {
        Text(String),
        Fail,
        Hang,
    }

    /// Replays scripted replies in order and records every prompt it saw
    #[derive(Default)]
    pub struct ScriptedProvider {
        replies: Mutex<VecDeque<Reply>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        pub fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn text(reply: &str) -> Reply {
            Reply::Text(reply.to_string())
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        async fn chat(
            &self,
            messages: &[ChatMessage],
            _system_prompt: Option<&str>,
        ) -> Result<String, LlmError> {
            let prompt = messages.iter().map(|m| m.content.clone()).collect::<Vec<_>>();
            self.prompts.lock().unwrap().push(prompt.join("\n"));

            let reply = self.replies.lock().unwrap().pop_front();
            match reply {
                Some(Reply::Text(text)) => Ok(text),
                Some(Reply::Fail) | None => Err(LlmError::request("scripted", "backend down")),
                Some(Reply::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-v1"
        }
    }
}
