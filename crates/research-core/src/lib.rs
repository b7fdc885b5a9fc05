//! research-core: iterative multi-round web research
//!
//! Each round searches the web, extracts readable text from the top pages,
//! and asks a language model for findings and open questions. Rounds repeat
//! until no gaps remain or the round limit is hit, then the model writes a
//! Markdown report.
//!
//! - [`SearchProvider`]: retrying search with degrade-to-empty
//! - [`ContentFetcher`]: cached, bounded-concurrency page extraction
//! - [`AnalysisEngine`]: analysis, follow-up queries and synthesis over a [`ChatProvider`]
//! - [`ResearchOrchestrator`]: the round state machine
//!
//! # Example
//!
//! ```rust,ignore
//! use research_core::{
//!     LlmSettings, ProgressReporter, ProviderKind, ResearchOptions,
//!     ResearchOrchestrator, ResearchSettings,
//! };
//!
//! let llm = LlmSettings::new(ProviderKind::DeepSeek).with_api_key(key);
//! let orchestrator = ResearchOrchestrator::from_settings(&llm, ResearchSettings::default())?;
//!
//! let progress = ProgressReporter::from_fn(|msg, cur, total| eprintln!("[{cur}/{total}] {msg}"));
//! let result = orchestrator
//!     .conduct_research("quantum computing", ResearchOptions::default(), &progress)
//!     .await?;
//!
//! println!("{}", result.final_report);
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod fetch;
pub mod llm;
pub mod research;
pub mod retry;
pub mod search;

pub use analysis::AnalysisEngine;
pub use config::ResearchSettings;
pub use error::{FetchError, LlmError, ResearchError, Retryable, SearchError};
pub use fetch::{ContentCache, ContentFetcher, HttpPageLoader, PageLoader};
pub use llm::{build_provider, ChatMessage, ChatProvider, ChatRole, LlmSettings, ProviderKind};
pub use research::{
    AnalysisResult, ContentMap, ProgressReporter, ProgressUpdate, ResearchOptions,
    ResearchOrchestrator, ResearchPhase, ResearchResult, ResearchRound,
};
pub use retry::RetryPolicy;
pub use search::{DuckDuckGoBackend, SearchBackend, SearchProvider, SearchRecord};
