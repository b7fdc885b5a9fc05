//! Shared fakes for the research workflow integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use research_core::analysis::prompts::AnalysisPrompts;
use research_core::{
    AnalysisEngine, ChatMessage, ChatProvider, ContentFetcher, FetchError, LlmError, PageLoader,
    ResearchOrchestrator, ResearchSettings, SearchBackend, SearchError, SearchProvider,
    SearchRecord,
};

/// Search backend answering from a fixed query table.
///
/// Unknown queries return no results; queries in `failing` time out on
/// every attempt.
#[derive(Default)]
pub struct FakeSearch {
    results: HashMap<String, Vec<SearchRecord>>,
    failing: Vec<String>,
    attempts: Mutex<HashMap<String, usize>>,
    sent: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, query: &str, urls: &[&str]) -> Self {
        let records = urls
            .iter()
            .map(|url| SearchRecord::new(format!("Page {}", url), *url, format!("About {}", url)))
            .collect();
        self.results.insert(query.to_string(), records);
        self
    }

    pub fn failing(mut self, query: &str) -> Self {
        self.failing.push(query.to_string());
        self
    }

    pub fn attempts(&self, query: &str) -> usize {
        self.attempts.lock().unwrap().get(query).copied().unwrap_or(0)
    }

    pub fn queries_seen(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    /// Every attempt in the order it reached the backend
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for FakeSearch {
    async fn fetch_results(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchRecord>, SearchError> {
        self.sent.lock().unwrap().push(query.to_string());
        *self
            .attempts
            .lock()
            .unwrap()
            .entry(query.to_string())
            .or_default() += 1;

        if self.failing.iter().any(|q| q == query) {
            return Err(SearchError::Timeout);
        }

        let mut records = self.results.get(query).cloned().unwrap_or_default();
        records.truncate(max_results);
        Ok(records)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Page loader serving `<article>` pages; URLs containing "broken" fail
#[derive(Default)]
pub struct FakePages {
    loads: AtomicUsize,
    loaded: Mutex<Vec<String>>,
}

impl FakePages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn loaded_urls(&self) -> Vec<String> {
        self.loaded.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageLoader for FakePages {
    async fn load(&self, url: &str) -> Result<String, FetchError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.loaded.lock().unwrap().push(url.to_string());

        if url.contains("broken") {
            return Err(FetchError::Status(503));
        }
        Ok(format!(
            "<html><body><nav>menu</nav><article>Text from {}</article></body></html>",
            url
        ))
    }
}

/// Scripted model reply
#[derive(Clone)]
pub enum Reply {
    Text(String),
    Fail,
}

pub fn text(reply: &str) -> Reply {
    Reply::Text(reply.to_string())
}

/// JSON analysis reply with the given gaps
pub fn analysis_json(summary: &str, gaps: &[&str]) -> Reply {
    Reply::Text(
        serde_json::json!({
            "key_findings": [format!("{} finding", summary)],
            "summary": summary,
            "topics": ["topic"],
            "gaps": gaps,
        })
        .to_string(),
    )
}

/// Chat provider that routes each call by its system prompt.
///
/// Exhausted queues answer with: an analysis without gaps, a failed
/// follow-up call and a report without references.
#[derive(Default)]
pub struct ScriptedChat {
    analyses: Mutex<VecDeque<Reply>>,
    follow_ups: Mutex<VecDeque<Reply>>,
    reports: Mutex<VecDeque<Reply>>,
    pub analysis_prompts: Mutex<Vec<String>>,
    pub follow_up_calls: AtomicUsize,
}

impl ScriptedChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analysis(self, reply: Reply) -> Self {
        self.analyses.lock().unwrap().push_back(reply);
        self
    }

    pub fn follow_up(self, reply: Reply) -> Self {
        self.follow_ups.lock().unwrap().push_back(reply);
        self
    }

    pub fn report(self, reply: Reply) -> Self {
        self.reports.lock().unwrap().push_back(reply);
        self
    }

    pub fn follow_up_calls(&self) -> usize {
        self.follow_up_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for ScriptedChat {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<String, LlmError> {
        let system = system_prompt.unwrap_or_default();
        let prompt = messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let reply = if system == AnalysisPrompts::analyst_system() {
            self.analysis_prompts.lock().unwrap().push(prompt);
            self.analyses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| analysis_json("default", &[]))
        } else if system == AnalysisPrompts::strategist_system() {
            self.follow_up_calls.fetch_add(1, Ordering::SeqCst);
            self.follow_ups.lock().unwrap().pop_front().unwrap_or(Reply::Fail)
        } else {
            self.reports
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| text("# Report\n\nBody."))
        };

        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Fail => Err(LlmError::request("scripted", "backend unavailable")),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-v1"
    }
}

/// Fast settings: millisecond backoff, no search throttle
pub fn test_settings() -> ResearchSettings {
    ResearchSettings::default()
        .with_retry(3, Duration::from_millis(1))
        .with_search_throttle(Duration::ZERO)
}

pub fn orchestrator(
    search: Arc<FakeSearch>,
    pages: Arc<FakePages>,
    chat: Arc<ScriptedChat>,
    settings: ResearchSettings,
) -> ResearchOrchestrator {
    let retry = settings.retry_policy();
    let provider = SearchProvider::new(search, retry.clone(), settings.search_throttle);
    let fetcher = ContentFetcher::new(pages, retry, settings.max_content_length);
    let engine = AnalysisEngine::new(chat, settings.llm_timeout);

    ResearchOrchestrator::new(provider, fetcher, engine, settings)
}
