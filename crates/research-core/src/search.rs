//! Web search
//!
//! [`SearchProvider`] turns a query into an ordered list of [`SearchRecord`]s.
//! The network side lives behind the [`SearchBackend`] trait; the default
//! backend scrapes DuckDuckGo's HTML endpoint, which needs no API key.
//!
//! The provider never fails: a backend that keeps failing after the retry
//! budget is spent yields an empty result list.

use async_trait::async_trait;
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ResearchSettings;
use crate::error::{ResearchError, SearchError};
use crate::fetch::extract::{collapse_whitespace, selector};
use crate::retry::RetryPolicy;

const DUCKDUCKGO_BASE_URL: &str = "https://html.duckduckgo.com";

pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A single search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SearchRecord {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

/// A search engine that can answer one query
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a single search attempt, returning at most `max_results` records
    async fn fetch_results(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchRecord>, SearchError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// DuckDuckGo HTML search backend
pub struct DuckDuckGoBackend {
    client: reqwest::Client,
    base_url: String,
}

impl DuckDuckGoBackend {
    pub fn new(timeout: Duration) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: DUCKDUCKGO_BASE_URL.to_string(),
        })
    }

    /// Point the backend at a different host (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoBackend {
    async fn fetch_results(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchRecord>, SearchError> {
        let url = format!(
            "{}/html/?q={}",
            self.base_url,
            urlencoding::encode(query)
        );

        debug!(url = %url, "Fetching search results");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited);
        }
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(parse_results(&body, max_results))
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}

/// Parse a DuckDuckGo HTML results page.
///
/// Result blocks carry the link in `a.result__a` and the description in
/// `.result__snippet`. Links usually point at DuckDuckGo's redirector with
/// the target URL in the `uddg` parameter.
fn parse_results(html: &str, max_results: usize) -> Vec<SearchRecord> {
    let (Some(block_sel), Some(link_sel), Some(snippet_sel)) = (
        selector(".result"),
        selector("a.result__a"),
        selector(".result__snippet"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut seen_urls = HashSet::new();
    let mut results = Vec::new();

    for block in document.select(&block_sel) {
        if results.len() >= max_results {
            break;
        }

        let Some(link) = block.select(&link_sel).next() else {
            continue;
        };
        let Some(url) = link.value().attr("href").and_then(resolve_result_url) else {
            continue;
        };

        // Sponsored results go through DuckDuckGo's own ad redirector
        if url.contains("duckduckgo.com") || !seen_urls.insert(url.clone()) {
            continue;
        }

        let mut title = collapse_whitespace(link.text());
        if title.is_empty() {
            title = extract_domain(&url).unwrap_or_else(|| "Result".to_string());
        }

        let snippet = block
            .select(&snippet_sel)
            .next()
            .map(|s| collapse_whitespace(s.text()))
            .unwrap_or_default();

        results.push(SearchRecord { title, url, snippet });
    }

    results
}

/// Turn a result link into the target URL, unwrapping the `uddg` redirect.
fn resolve_result_url(href: &str) -> Option<String> {
    let url = if let Some((_, rest)) = href.split_once("uddg=") {
        let encoded = rest.split('&').next().unwrap_or(rest);
        urlencoding::decode(encoded).ok()?.into_owned()
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        href.to_string()
    };

    url.starts_with("http").then_some(url)
}

/// Extract the domain name from a URL.
fn extract_domain(url: &str) -> Option<String> {
    url.split("//")
        .nth(1)?
        .split('/')
        .next()
        .map(|s| s.to_string())
}

/// Retrying, never-failing search front end
pub struct SearchProvider {
    backend: Arc<dyn SearchBackend>,
    retry: RetryPolicy,
    throttle: Duration,
}

impl SearchProvider {
    pub fn new(backend: Arc<dyn SearchBackend>, retry: RetryPolicy, throttle: Duration) -> Self {
        Self {
            backend,
            retry,
            throttle,
        }
    }

    /// DuckDuckGo-backed provider configured from `settings`
    pub fn duckduckgo(settings: &ResearchSettings) -> Result<Self, ResearchError> {
        let backend = DuckDuckGoBackend::new(settings.request_timeout).map_err(|e| {
            ResearchError::Configuration(format!("failed to build search client: {}", e))
        })?;

        Ok(Self::new(
            Arc::new(backend),
            settings.retry_policy(),
            settings.search_throttle,
        ))
    }

    /// Search for `query`, returning at most `max_results` records.
    ///
    /// Returns an empty list once the retry budget is exhausted.
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<SearchRecord> {
        info!(query = %query, max_results, backend = self.backend.name(), "Performing web search");

        let outcome = self
            .retry
            .run(query, || self.backend.fetch_results(query, max_results))
            .await;

        match outcome {
            Ok(mut results) => {
                results.truncate(max_results);
                if results.is_empty() {
                    warn!(query = %query, "No search results found");
                } else {
                    info!(query = %query, count = results.len(), "Search completed");
                }
                results
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Search failed, continuing without results");
                Vec::new()
            }
        }
    }

    /// Run several queries one after another, pausing between them.
    ///
    /// Queries are serialized to stay under provider rate limits.
    pub async fn search_multiple(
        &self,
        queries: &[String],
        max_results: usize,
    ) -> Vec<(String, Vec<SearchRecord>)> {
        self.search_each(queries, max_results, |_| {}).await
    }

    /// Like [`search_multiple`](Self::search_multiple), calling `on_query`
    /// right before each query is sent.
    ///
    /// The throttle is applied before every query but the first.
    pub async fn search_each<F>(
        &self,
        queries: &[String],
        max_results: usize,
        mut on_query: F,
    ) -> Vec<(String, Vec<SearchRecord>)>
    where
        F: FnMut(&str),
    {
        let mut results = Vec::with_capacity(queries.len());

        for (i, query) in queries.iter().enumerate() {
            if i > 0 && !self.throttle.is_zero() {
                debug!(delay_ms = self.throttle.as_millis() as u64, "Throttling before next query");
                tokio::time::sleep(self.throttle).await;
            }
            on_query(query);
            let records = self.search(query, max_results).await;
            results.push((query.clone(), records));
        }

        results
    }
}
