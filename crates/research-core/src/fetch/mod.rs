//! Page content extraction
//!
//! [`ContentFetcher`] downloads pages through a [`PageLoader`], reduces them
//! to readable text and caches successful results per URL. Failures are
//! isolated per URL: `extract` returns `None` rather than an error, and a
//! failing or panicking fetch never disturbs its siblings in
//! [`ContentFetcher::extract_multiple`].

pub mod cache;
pub mod extract;
pub mod loader;

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::ResearchSettings;
use crate::error::ResearchError;
use crate::research::state::ContentMap;
use crate::retry::RetryPolicy;

pub use cache::ContentCache;
pub use extract::extract_main_text;
pub use loader::{HttpPageLoader, PageLoader};

/// Cached, retrying page-to-text extractor.
///
/// Cloning is cheap; clones share the loader and the cache.
#[derive(Clone)]
pub struct ContentFetcher {
    loader: Arc<dyn PageLoader>,
    cache: Arc<ContentCache>,
    retry: RetryPolicy,
    max_content_length: usize,
}

impl ContentFetcher {
    pub fn new(loader: Arc<dyn PageLoader>, retry: RetryPolicy, max_content_length: usize) -> Self {
        Self {
            loader,
            cache: Arc::new(ContentCache::unbounded()),
            retry,
            max_content_length,
        }
    }

    /// Replace the default unbounded cache
    pub fn with_cache(mut self, cache: ContentCache) -> Self {
        self.cache = Arc::new(cache);
        self
    }

    /// HTTP-backed fetcher configured from `settings`
    pub fn http(settings: &ResearchSettings) -> Result<Self, ResearchError> {
        let loader = HttpPageLoader::new(settings.request_timeout).map_err(|e| {
            ResearchError::Configuration(format!("failed to build HTTP client: {}", e))
        })?;

        let cache = match settings.cache_capacity {
            Some(capacity) => ContentCache::with_capacity(capacity),
            None => ContentCache::unbounded(),
        };

        Ok(Self::new(
            Arc::new(loader),
            settings.retry_policy(),
            settings.max_content_length,
        )
        .with_cache(cache))
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Extract readable text from `url`.
    ///
    /// Served from cache when the URL previously succeeded. Returns `None`
    /// when the download keeps failing or the page has no usable text.
    pub async fn extract(&self, url: &str) -> Option<String> {
        if let Some(cached) = self.cache.get(url).await {
            debug!(url = %url, "Content served from cache");
            return Some(cached);
        }

        info!(url = %url, "Extracting page content");

        let html = match self.retry.run(url, || self.loader.load(url)).await {
            Ok(html) => html,
            Err(e) => {
                warn!(url = %url, error = %e, "Content extraction failed");
                return None;
            }
        };

        let Some(text) = extract_main_text(&html, self.max_content_length) else {
            warn!(url = %url, "No main content found");
            return None;
        };

        self.cache.insert(url, text.clone()).await;
        info!(url = %url, chars = text.chars().count(), "Content extracted");
        Some(text)
    }

    /// Extract several URLs concurrently with at most `concurrency` in flight.
    ///
    /// Waits for every fetch to settle. The returned map holds exactly the
    /// URLs that produced text.
    pub async fn extract_multiple(&self, urls: &[String], concurrency: usize) -> ContentMap {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut tasks = JoinSet::new();
        let mut seen = HashSet::new();

        for url in urls {
            if !seen.insert(url.as_str()) {
                continue;
            }

            let fetcher = self.clone();
            let semaphore = semaphore.clone();
            let url = url.clone();

            tasks.spawn(async move {
                // Held until the task ends
                let _permit = semaphore.acquire_owned().await.ok()?;
                let content = fetcher.extract(&url).await?;
                Some((url, content))
            });
        }

        let mut contents = ContentMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some((url, content))) => {
                    contents.insert(url, content);
                }
                Ok(None) => {}
                Err(e) => error!(error = %e, "Extraction task aborted"),
            }
        }

        info!(
            requested = seen.len(),
            succeeded = contents.len(),
            "Concurrent extraction finished"
        );
        contents
    }
}
