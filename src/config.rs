//! # Configuration Module
//!
//! Loads the research engine and model settings from environment variables
//! (and a `.env` file when present). The library crate only knows typed
//! settings; turning strings into them happens here.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use research_core::{LlmSettings, ProviderKind, ResearchSettings};

// =============================================================================
// CONFIGURATION STRUCT
// =============================================================================
/// Credentials and model choice for one backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub api_key: Option<String>,
    pub model: Option<String>,
}

/// Application configuration.
///
/// Credentials are kept for every backend so a `--provider` flag can switch
/// backends after loading.
#[derive(Debug, Clone)]
pub struct Config {
    /// Active backend (AI_PROVIDER)
    pub provider: ProviderKind,

    /// Per-backend API key and model, from `<PROVIDER>_API_KEY` / `<PROVIDER>_MODEL`
    pub credentials: HashMap<ProviderKind, ProviderCredentials>,

    /// Model forced from the command line; wins over `<PROVIDER>_MODEL`
    pub model_override: Option<String>,

    /// DeepSeek endpoint override (DEEPSEEK_BASE_URL)
    pub deepseek_base_url: Option<String>,

    /// Engine tunables
    pub research: ResearchSettings,

    /// Where exported reports go
    pub output_dir: PathBuf,

    /// Log filter directive for the application
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            credentials: HashMap::new(),
            model_override: None,
            deepseek_base_url: None,
            research: ResearchSettings::default(),
            output_dir: PathBuf::from("outputs"),
            log_level: "info".to_string(),
        }
    }
}

// =============================================================================
// CONFIGURATION LOADING
// =============================================================================
impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Example
    /// ```ignore
    /// let config = Config::from_env()?;
    /// println!("Using provider: {}", config.provider);
    /// ```
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (silently ignore if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    ///
    /// # Rust Concept: Closures as Parameters
    ///
    /// Taking `impl Fn(&str) -> Option<String>` lets tests pass a `HashMap`
    /// lookup instead of touching real environment variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(val) = lookup("AI_PROVIDER") {
            config.provider = ProviderKind::from_str(&val).map_err(anyhow::Error::msg)?;
        }

        for kind in [
            ProviderKind::DeepSeek,
            ProviderKind::OpenAi,
            ProviderKind::Anthropic,
        ] {
            let prefix = kind.as_str().to_ascii_uppercase();
            let credentials = ProviderCredentials {
                api_key: lookup(kind.api_key_env()).filter(|k| !k.trim().is_empty()),
                model: lookup(&format!("{}_MODEL", prefix)).filter(|m| !m.trim().is_empty()),
            };
            config.credentials.insert(kind, credentials);
        }

        config.deepseek_base_url = lookup("DEEPSEEK_BASE_URL").filter(|u| !u.trim().is_empty());

        if let Some(val) = lookup("MAX_RESEARCH_ROUNDS") {
            config.research.max_rounds = val
                .parse()
                .context("MAX_RESEARCH_ROUNDS must be a valid positive integer")?;
        }

        if let Some(val) = lookup("RESULTS_PER_SEARCH") {
            config.research.results_per_search = val
                .parse()
                .context("RESULTS_PER_SEARCH must be a valid positive integer")?;
        }

        if let Some(val) = lookup("MAX_CONCURRENT_REQUESTS") {
            config.research.max_concurrent_requests = val
                .parse()
                .context("MAX_CONCURRENT_REQUESTS must be a valid positive integer")?;
        }

        if let Some(val) = lookup("MAX_CONTENT_LENGTH") {
            config.research.max_content_length = val
                .parse()
                .context("MAX_CONTENT_LENGTH must be a valid positive integer")?;
        }

        if let Some(val) = lookup("REQUEST_TIMEOUT_SECS") {
            let secs: u64 = val
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds (e.g., 30)")?;
            config.research.request_timeout = Duration::from_secs(secs);
        }

        if let Some(val) = lookup("LLM_TIMEOUT_SECS") {
            let secs: u64 = val
                .parse()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds (e.g., 300)")?;
            config.research.llm_timeout = Duration::from_secs(secs);
        }

        if let Some(val) = lookup("OUTPUT_DIR") {
            config.output_dir = PathBuf::from(val);
        }

        if let Some(val) = lookup("RUST_LOG") {
            config.log_level = val;
        }

        Ok(config)
    }

    /// Credentials of the active backend
    pub fn active_credentials(&self) -> ProviderCredentials {
        self.credentials
            .get(&self.provider)
            .cloned()
            .unwrap_or_default()
    }

    /// Model settings for the active backend
    pub fn llm_settings(&self) -> LlmSettings {
        let credentials = self.active_credentials();
        let mut settings = LlmSettings::new(self.provider);

        if let Some(model) = self.model_override.clone().or(credentials.model) {
            settings = settings.with_model(model);
        }
        if let Some(key) = credentials.api_key {
            settings = settings.with_api_key(key);
        }
        if self.provider == ProviderKind::DeepSeek {
            if let Some(url) = &self.deepseek_base_url {
                settings = settings.with_base_url(url.clone());
            }
        }

        settings
    }

    /// Validate the configuration before any network call.
    pub fn validate(&self) -> Result<()> {
        self.research
            .validate()
            .context("Invalid research settings")?;

        if self.active_credentials().api_key.is_none() {
            anyhow::bail!(
                "{} is required when AI_PROVIDER is '{}'",
                self.provider.api_key_env(),
                self.provider
            );
        }

        Ok(())
    }
}
