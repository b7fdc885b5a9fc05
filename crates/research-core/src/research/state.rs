//! Research run data model
//!
//! Every value here is created by one orchestrator run and handed out only
//! inside the final [`ResearchResult`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::search::SearchRecord;

/// Extracted page text keyed by URL
pub type ContentMap = HashMap<String, String>;

/// Structured findings for one round.
///
/// Missing fields in model output deserialize as empty, so a value of this
/// type is always complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_findings: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Open questions; an empty list ends the research loop
    #[serde(default)]
    pub gaps: Vec<String>,
}

impl AnalysisResult {
    /// Fallback for model output that is not the expected JSON object
    pub fn from_raw_text(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            key_findings: vec![raw.clone()],
            summary: raw,
            topics: Vec::new(),
            gaps: Vec::new(),
        }
    }

    pub fn has_gaps(&self) -> bool {
        !self.gaps.is_empty()
    }
}

/// One search, extract, analyze cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchRound {
    /// 1-based, strictly increasing within a run
    pub round_number: usize,
    pub queries: Vec<String>,
    pub search_results: Vec<SearchRecord>,
    /// Keys are always a subset of `search_results` URLs
    pub extracted_contents: ContentMap,
    pub analysis: AnalysisResult,
}

impl ResearchRound {
    /// URLs of this round's search results, in result order
    pub fn source_urls(&self) -> impl Iterator<Item = &str> {
        self.search_results
            .iter()
            .map(|r| r.url.as_str())
            .filter(|url| !url.is_empty())
    }
}

/// Deduplicated, sorted URLs across `rounds`
pub fn collect_sources(rounds: &[ResearchRound]) -> BTreeSet<String> {
    rounds
        .iter()
        .flat_map(|round| round.source_urls())
        .map(str::to_string)
        .collect()
}

/// Final output of a research run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchResult {
    pub topic: String,
    /// Markdown report
    pub final_report: String,
    pub rounds: Vec<ResearchRound>,
    pub all_sources: BTreeSet<String>,
    pub timestamp: DateTime<Utc>,
    pub total_rounds: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(number: usize, urls: &[&str]) -> ResearchRound {
        ResearchRound {
            round_number: number,
            queries: vec![format!("query {}", number)],
            search_results: urls
                .iter()
                .map(|u| SearchRecord::new("t", *u, "s"))
                .collect(),
            extracted_contents: ContentMap::new(),
            analysis: AnalysisResult::default(),
        }
    }

    #[test]
    fn test_analysis_defaults_missing_fields() {
        let analysis: AnalysisResult = serde_json::from_str(r#"{"summary": "only"}"#).unwrap();

        assert_eq!(analysis.summary, "only");
        assert!(analysis.key_findings.is_empty());
        assert!(!analysis.has_gaps());
    }

    #[test]
    fn test_from_raw_text() {
        let analysis = AnalysisResult::from_raw_text("not json");

        assert_eq!(analysis.summary, "not json");
        assert_eq!(analysis.key_findings, vec!["not json"]);
        assert!(analysis.topics.is_empty());
        assert!(analysis.gaps.is_empty());
    }

    #[test]
    fn test_collect_sources_dedupes_and_sorts() {
        let rounds = vec![
            round(1, &["https://b.com", "https://a.com"]),
            round(2, &["https://a.com", "", "https://c.com"]),
        ];

        let sources: Vec<String> = collect_sources(&rounds).into_iter().collect();

        assert_eq!(sources, vec!["https://a.com", "https://b.com", "https://c.com"]);
    }
}
