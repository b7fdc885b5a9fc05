//! Round-based research state machine
//!
//! ```text
//! RoundStart -> QuerySelection -> Searching -> Extracting -> Analyzing
//!      ^                |                                        |
//!      |                v (no queries)                           v
//!      +------------ ContinueDecision <--------------------------+
//!                       |
//!                       v (max rounds reached or no gaps)
//!                  Synthesizing -> Done
//! ```
//!
//! Only extraction runs concurrently. Every other phase completes before the
//! next one starts.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, error, info, instrument};

use super::progress::ProgressReporter;
use super::state::{AnalysisResult, ContentMap, ResearchResult, ResearchRound};
use crate::analysis::AnalysisEngine;
use crate::config::ResearchSettings;
use crate::error::ResearchError;
use crate::fetch::ContentFetcher;
use crate::llm::LlmSettings;
use crate::search::{SearchProvider, SearchRecord};

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResearchPhase {
    /// Begin the next round
    RoundStart,
    /// Topic for round 1, follow-up queries afterwards
    QuerySelection,
    Searching,
    Extracting,
    Analyzing,
    /// Record the round and decide whether another one runs
    ContinueDecision,
    Synthesizing,
    Done,
}

impl ResearchPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Per-call overrides of [`ResearchSettings`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchOptions {
    pub max_rounds: Option<usize>,
    pub results_per_search: Option<usize>,
}

impl ResearchOptions {
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    pub fn with_results_per_search(mut self, results: usize) -> Self {
        self.results_per_search = Some(results);
        self
    }
}

/// Round under construction
struct RoundDraft {
    queries: Vec<String>,
    search_results: Vec<SearchRecord>,
    extracted_contents: ContentMap,
    analysis: AnalysisResult,
}

/// Mutable state of one `conduct_research` call
struct ResearchRun {
    topic: String,
    max_rounds: usize,
    results_per_search: usize,
    round_index: usize,
    rounds: Vec<ResearchRound>,
    sources: BTreeSet<String>,
    draft: Option<RoundDraft>,
    report: String,
}

impl ResearchRun {
    fn round_label(&self) -> String {
        format!("Round {}/{}", self.round_index, self.max_rounds)
    }
}

/// Drives search, extraction and analysis rounds, then synthesis
pub struct ResearchOrchestrator {
    search: SearchProvider,
    fetcher: ContentFetcher,
    engine: AnalysisEngine,
    settings: ResearchSettings,
}

impl ResearchOrchestrator {
    pub fn new(
        search: SearchProvider,
        fetcher: ContentFetcher,
        engine: AnalysisEngine,
        settings: ResearchSettings,
    ) -> Self {
        Self {
            search,
            fetcher,
            engine,
            settings,
        }
    }

    /// DuckDuckGo search, HTTP page loading and the configured model backend.
    ///
    /// Fails before any network traffic when the settings are invalid or
    /// the model credential is missing.
    pub fn from_settings(
        llm: &LlmSettings,
        settings: ResearchSettings,
    ) -> Result<Self, ResearchError> {
        settings.validate()?;

        let search = SearchProvider::duckduckgo(&settings)?;
        let fetcher = ContentFetcher::http(&settings)?;
        let engine = AnalysisEngine::from_settings(llm, &settings)?;

        Ok(Self::new(search, fetcher, engine, settings))
    }

    pub fn settings(&self) -> &ResearchSettings {
        &self.settings
    }

    pub fn fetcher(&self) -> &ContentFetcher {
        &self.fetcher
    }

    /// Research `topic` over up to `max_rounds` rounds and write a report.
    ///
    /// Search and extraction failures degrade to empty data. A failed
    /// analysis call aborts the run; a failed follow-up query call ends the
    /// loop early and the report is written from the completed rounds.
    #[instrument(skip_all, fields(topic = %topic))]
    pub async fn conduct_research(
        &self,
        topic: &str,
        options: ResearchOptions,
        progress: &ProgressReporter,
    ) -> Result<ResearchResult, ResearchError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ResearchError::InvalidTopic);
        }

        let max_rounds = options.max_rounds.unwrap_or(self.settings.max_rounds);
        let results_per_search = options
            .results_per_search
            .unwrap_or(self.settings.results_per_search);
        if max_rounds == 0 {
            return Err(ResearchError::Configuration(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        if results_per_search == 0 {
            return Err(ResearchError::Configuration(
                "results_per_search must be at least 1".to_string(),
            ));
        }

        info!(max_rounds, results_per_search, "Starting research");

        let mut run = ResearchRun {
            topic: topic.to_string(),
            max_rounds,
            results_per_search,
            round_index: 0,
            rounds: Vec::new(),
            sources: BTreeSet::new(),
            draft: None,
            report: String::new(),
        };

        let mut phase = ResearchPhase::RoundStart;
        while !phase.is_terminal() {
            debug!(?phase, round = run.round_index, "Entering phase");
            phase = self.step(phase, &mut run, progress).await?;
        }

        info!(
            rounds = run.rounds.len(),
            sources = run.sources.len(),
            "Research complete"
        );

        Ok(ResearchResult {
            topic: run.topic,
            final_report: run.report,
            total_rounds: run.rounds.len(),
            rounds: run.rounds,
            all_sources: run.sources,
            timestamp: Utc::now(),
        })
    }

    async fn step(
        &self,
        phase: ResearchPhase,
        run: &mut ResearchRun,
        progress: &ProgressReporter,
    ) -> Result<ResearchPhase, ResearchError> {
        let next = match phase {
            ResearchPhase::RoundStart => {
                run.round_index += 1;
                info!(round = run.round_index, "=== Research round ===");
                progress.report(
                    &format!("{}: searching...", run.round_label()),
                    run.round_index,
                    run.max_rounds,
                );
                ResearchPhase::QuerySelection
            }

            ResearchPhase::QuerySelection => {
                let queries = self.select_queries(run).await;
                if queries.is_empty() {
                    info!("No further queries, ending research loop");
                    run.round_index -= 1;
                    ResearchPhase::Synthesizing
                } else {
                    run.draft = Some(RoundDraft {
                        queries,
                        search_results: Vec::new(),
                        extracted_contents: ContentMap::new(),
                        analysis: AnalysisResult::default(),
                    });
                    ResearchPhase::Searching
                }
            }

            ResearchPhase::Searching => {
                let label = run.round_label();
                let (current, total) = (run.round_index, run.max_rounds);
                let Some(draft) = run.draft.as_mut() else {
                    return Ok(ResearchPhase::ContinueDecision);
                };

                let batches = self
                    .search
                    .search_each(&draft.queries, run.results_per_search, |query| {
                        progress.report(&format!("{}: searching '{}'", label, query), current, total);
                    })
                    .await;

                for (_, results) in batches {
                    run.sources.extend(
                        results
                            .iter()
                            .filter(|r| !r.url.is_empty())
                            .map(|r| r.url.clone()),
                    );
                    draft.search_results.extend(results);
                }

                info!(results = draft.search_results.len(), "Search phase complete");
                ResearchPhase::Extracting
            }

            ResearchPhase::Extracting => {
                progress.report(
                    &format!("{}: extracting page content...", run.round_label()),
                    run.round_index,
                    run.max_rounds,
                );
                let Some(draft) = run.draft.as_mut() else {
                    return Ok(ResearchPhase::ContinueDecision);
                };

                let urls: Vec<String> = draft
                    .search_results
                    .iter()
                    .take(self.settings.max_extract_urls)
                    .filter(|r| !r.url.is_empty())
                    .map(|r| r.url.clone())
                    .collect();

                draft.extracted_contents = self
                    .fetcher
                    .extract_multiple(&urls, self.settings.max_concurrent_requests)
                    .await;
                ResearchPhase::Analyzing
            }

            ResearchPhase::Analyzing => {
                progress.report(
                    &format!("{}: analyzing...", run.round_label()),
                    run.round_index,
                    run.max_rounds,
                );
                let Some(draft) = run.draft.as_mut() else {
                    return Ok(ResearchPhase::ContinueDecision);
                };

                let query = draft.queries.first().map(String::as_str).unwrap_or(run.topic.as_str());
                draft.analysis = self
                    .engine
                    .analyze(query, &draft.search_results, &draft.extracted_contents)
                    .await?;
                ResearchPhase::ContinueDecision
            }

            ResearchPhase::ContinueDecision => {
                let Some(draft) = run.draft.take() else {
                    return Ok(ResearchPhase::Synthesizing);
                };
                let has_gaps = draft.analysis.has_gaps();

                run.rounds.push(ResearchRound {
                    round_number: run.round_index,
                    queries: draft.queries,
                    search_results: draft.search_results,
                    extracted_contents: draft.extracted_contents,
                    analysis: draft.analysis,
                });

                if run.round_index >= run.max_rounds {
                    info!("Reached maximum rounds");
                    ResearchPhase::Synthesizing
                } else if !has_gaps {
                    info!("No information gaps left, ending research loop");
                    ResearchPhase::Synthesizing
                } else {
                    ResearchPhase::RoundStart
                }
            }

            ResearchPhase::Synthesizing => {
                progress.report("Generating final report...", run.max_rounds, run.max_rounds);
                run.report = self.engine.synthesize(&run.topic, &run.rounds).await;
                ResearchPhase::Done
            }

            ResearchPhase::Done => ResearchPhase::Done,
        };

        Ok(next)
    }

    /// Queries for the current round; empty ends the loop
    async fn select_queries(&self, run: &ResearchRun) -> Vec<String> {
        let Some(previous) = run.rounds.last() else {
            return vec![run.topic.clone()];
        };

        match self
            .engine
            .generate_follow_up_queries(&run.topic, &previous.analysis, run.round_index - 1)
            .await
        {
            Ok(queries) => queries,
            Err(e) => {
                error!(error = %e, "Follow-up query generation failed");
                Vec::new()
            }
        }
    }
}
