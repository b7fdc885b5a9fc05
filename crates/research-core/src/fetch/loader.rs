//! Raw page download

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::FetchError;
use crate::search::BROWSER_USER_AGENT;

/// Source of raw HTML for a URL (one attempt, no retries)
#[async_trait]
pub trait PageLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<String, FetchError>;
}

/// `reqwest`-backed page loader
pub struct HttpPageLoader {
    client: reqwest::Client,
}

impl HttpPageLoader {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageLoader for HttpPageLoader {
    async fn load(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // Decodes using the charset from Content-Type, defaulting to UTF-8
        let body = response.text().await?;
        debug!(url = %url, bytes = body.len(), "Page downloaded");
        Ok(body)
    }
}
