//! Error types for the research engine
//!
//! Network failures (search, page fetch) are typed so the retry helper can
//! tell transient failures from permanent ones. Only a URL that cannot be
//! requested at all is permanent. They never escape the
//! search provider or content fetcher: both degrade locally. Only model
//! call failures and configuration problems reach the caller, wrapped in
//! [`ResearchError`].

use thiserror::Error;

/// Errors that can be retried by [`crate::retry::RetryPolicy`]
pub trait Retryable {
    /// Whether another attempt could plausibly succeed
    fn is_retryable(&self) -> bool;
}

/// Search backend failure
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited by search provider")]
    RateLimited,

    #[error("HTTP error ({0})")]
    Status(u16),
}

impl Retryable for SearchError {
    fn is_retryable(&self) -> bool {
        // Any search failure may be transient, including 4xx pages served
        // while the provider throttles scrapers
        match self {
            SearchError::Timeout
            | SearchError::Connection(_)
            | SearchError::Network(_)
            | SearchError::RateLimited
            | SearchError::Status(_) => true,
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Timeout
        } else if e.is_connect() {
            SearchError::Connection(e.to_string())
        } else {
            SearchError::Network(e.to_string())
        }
    }
}

/// Page fetch failure
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error ({0})")]
    Status(u16),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl Retryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout
            | FetchError::Connection(_)
            | FetchError::Network(_)
            | FetchError::Status(_) => true,
            FetchError::InvalidUrl(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connection(e.to_string())
        } else if e.is_builder() {
            FetchError::InvalidUrl(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// Language model call failure
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("{provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("Model call timed out after {0}s")]
    Timeout(u64),
}

impl LlmError {
    pub fn request(provider: impl Into<String>, message: impl Into<String>) -> Self {
        LlmError::Request {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Top-level error returned by the research engine
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Research topic must not be empty")]
    InvalidTopic,

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}
