//! Research engine configuration
//!
//! Tunables shared by the search provider, content fetcher, analysis engine
//! and orchestrator. Loading these from the environment is the job of the
//! application; this module only defines defaults and validation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ResearchError;
use crate::retry::RetryPolicy;

/// Research engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchSettings {
    /// Upper bound on research rounds per run
    pub max_rounds: usize,

    /// Results requested from the search provider per query
    pub results_per_search: usize,

    /// Worker slots for concurrent page extraction
    pub max_concurrent_requests: usize,

    /// Timeout for each search request or page fetch
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Timeout for one language model call; report generation can take minutes
    #[serde(with = "humantime_serde")]
    pub llm_timeout: Duration,

    /// Attempts per search query or page fetch
    pub max_retries: u32,

    /// Base delay for exponential backoff
    #[serde(with = "humantime_serde")]
    pub retry_base_delay: Duration,

    /// Pause between consecutive search queries
    #[serde(with = "humantime_serde")]
    pub search_throttle: Duration,

    /// Maximum characters kept from one extracted page
    pub max_content_length: usize,

    /// Search result URLs extracted per round
    pub max_extract_urls: usize,

    /// Content cache bound; `None` keeps every page for the fetcher's lifetime
    pub cache_capacity: Option<usize>,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            results_per_search: 10,
            max_concurrent_requests: 5,
            request_timeout: Duration::from_secs(30),
            llm_timeout: Duration::from_secs(300),
            max_retries: 3,
            retry_base_delay: Duration::from_secs(1),
            search_throttle: Duration::from_millis(500),
            max_content_length: 5000,
            max_extract_urls: 10,
            cache_capacity: None,
        }
    }
}

impl ResearchSettings {
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_results_per_search(mut self, results: usize) -> Self {
        self.results_per_search = results;
        self
    }

    pub fn with_max_concurrent_requests(mut self, concurrency: usize) -> Self {
        self.max_concurrent_requests = concurrency;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_base_delay = base_delay;
        self
    }

    pub fn with_search_throttle(mut self, throttle: Duration) -> Self {
        self.search_throttle = throttle;
        self
    }

    pub fn with_max_content_length(mut self, length: usize) -> Self {
        self.max_content_length = length;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    /// The retry policy shared by search and extraction
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_base_delay)
    }

    /// Reject settings that would make a run meaningless
    pub fn validate(&self) -> Result<(), ResearchError> {
        if self.max_rounds == 0 {
            return Err(ResearchError::Configuration(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        if self.results_per_search == 0 {
            return Err(ResearchError::Configuration(
                "results_per_search must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent_requests == 0 {
            return Err(ResearchError::Configuration(
                "max_concurrent_requests must be at least 1".to_string(),
            ));
        }
        if self.request_timeout.is_zero() || self.llm_timeout.is_zero() {
            return Err(ResearchError::Configuration(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(ResearchError::Configuration(
                "max_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
