//! Prompt templates for the analysis engine
//!
//! Three prompt pairs, one per engine operation:
//! - Analyst: search results + page samples -> JSON findings object
//! - Strategist: findings + gaps -> JSON array of follow-up queries
//! - Writer: every round's findings -> Markdown report

use std::collections::HashSet;

use crate::research::state::{AnalysisResult, ContentMap, ResearchRound};
use crate::search::SearchRecord;

/// Search results included in the analysis prompt
pub const MAX_PROMPT_RESULTS: usize = 10;

/// Pages sampled into the analysis prompt
pub const MAX_CONTENT_SAMPLES: usize = 5;

/// Characters kept from each sampled page
pub const CONTENT_SAMPLE_CHARS: usize = 500;

/// Findings listed per round in the synthesis prompt
pub const FINDINGS_PER_ROUND: usize = 5;

/// Prompt templates for analysis, follow-up planning and synthesis
pub struct AnalysisPrompts;

impl AnalysisPrompts {
    pub fn analyst_system() -> &'static str {
        "You are a professional research analyst. Your job is to analyze search results and web page content and extract the key information."
    }

    pub fn strategist_system() -> &'static str {
        "You are a research strategist. Based on the analysis so far, you design deeper follow-up search queries."
    }

    pub fn writer_system() -> &'static str {
        "You are an expert research report writer. You consolidate multiple research rounds into one well-structured, information-rich report."
    }

    /// User prompt for `analyze`.
    ///
    /// Only the first [`MAX_PROMPT_RESULTS`] results are listed. Page samples
    /// follow result order, at most [`MAX_CONTENT_SAMPLES`] of them, each cut
    /// to [`CONTENT_SAMPLE_CHARS`] characters.
    pub fn analysis(query: &str, results: &[SearchRecord], contents: &ContentMap) -> String {
        let listed = &results[..results.len().min(MAX_PROMPT_RESULTS)];
        let results_json =
            serde_json::to_string_pretty(listed).unwrap_or_else(|_| "[]".to_string());

        let mut samples = String::new();
        let mut seen = HashSet::new();
        for record in results {
            if seen.len() == MAX_CONTENT_SAMPLES {
                break;
            }
            let Some(content) = contents.get(&record.url) else {
                continue;
            };
            if !seen.insert(record.url.as_str()) {
                continue;
            }
            samples.push_str(&format!(
                "\n**URL**: {}\n**Content**: {}...\n",
                record.url,
                char_prefix(content, CONTENT_SAMPLE_CHARS)
            ));
        }

        let content_section = if samples.is_empty() {
            String::new()
        } else {
            format!("\n### Page content samples\n{}", samples)
        };

        format!(
            r#"Analyze the following search results and extract the key information and main findings.

**Query**: {query}

**Search results**:
{results_json}
{content_section}
Return the analysis as a JSON object with these fields:
- key_findings: list of main findings (array of strings)
- summary: overall summary (string)
- topics: topics identified (array of strings)
- gaps: information gaps or directions needing further research (array of strings)"#
        )
    }

    /// User prompt for `generate_follow_up_queries`
    pub fn follow_up(topic: &str, analysis: &AnalysisResult) -> String {
        let findings =
            serde_json::to_string_pretty(&analysis.key_findings).unwrap_or_else(|_| "[]".into());
        let gaps = serde_json::to_string_pretty(&analysis.gaps).unwrap_or_else(|_| "[]".into());

        format!(
            r#"Based on the research progress below, generate 2-3 deeper search queries that fill the information gaps.

**Original topic**: {topic}

**Current findings**:
{findings}

**Information gaps**:
{gaps}

**Requirements**:
1. Queries should be more specific and go deeper
2. Avoid repeating information already found
3. Focus on the gaps and unexplored angles
4. Keep each query short and precise

Return the queries as a JSON array, for example: ["query 1", "query 2", "query 3"]"#
        )
    }

    /// User prompt for `synthesize`
    pub fn synthesis(topic: &str, rounds: &[ResearchRound]) -> String {
        let mut rounds_summary = String::new();

        for (i, round) in rounds.iter().enumerate() {
            rounds_summary.push_str(&format!("\n### Round {}\n", i + 1));
            rounds_summary.push_str(&format!("**Queries**: {}\n", round.queries.join(", ")));

            if !round.analysis.key_findings.is_empty() {
                rounds_summary.push_str("**Key findings**:\n");
                for finding in round.analysis.key_findings.iter().take(FINDINGS_PER_ROUND) {
                    rounds_summary.push_str(&format!("- {}\n", finding));
                }
            }
        }

        format!(
            r#"Write a comprehensive research report based on the multi-round research data below.

**Research topic**: {topic}

**Research data**:
{rounds_summary}
**Requirements**:
1. Use Markdown
2. Include these sections:
   - # Title of the research topic
   - ## Overview (Executive Summary)
   - ## Key Findings
   - ## Detailed Analysis
   - ## Conclusions and Outlook
   - ## References
3. Keep the structure clear and the argument coherent
4. Use bulleted and numbered lists for readability
5. List every source URL in the References section

Produce the complete Markdown report."#
        )
    }
}

/// First `max_chars` characters of `text`
fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(count: usize) -> Vec<SearchRecord> {
        (0..count)
            .map(|i| {
                SearchRecord::new(
                    format!("Title {}", i),
                    format!("https://site{}.com", i),
                    "snippet",
                )
            })
            .collect()
    }

    #[test]
    fn test_analysis_prompt_limits_results() {
        let prompt = AnalysisPrompts::analysis("rust async", &records(12), &ContentMap::new());

        assert!(prompt.contains("**Query**: rust async"));
        assert!(prompt.contains("https://site9.com"));
        assert!(!prompt.contains("https://site10.com"));
        assert!(!prompt.contains("Page content samples"));
    }

    #[test]
    fn test_analysis_prompt_samples_content_in_result_order() {
        let results = records(8);
        let contents: ContentMap = results
            .iter()
            .rev()
            .map(|r| (r.url.clone(), format!("{}{}", "é".repeat(600), r.url)))
            .collect();

        let prompt = AnalysisPrompts::analysis("q", &results, &contents);

        assert_eq!(prompt.matches("**URL**").count(), MAX_CONTENT_SAMPLES);
        assert!(prompt.contains("**URL**: https://site0.com"));
        assert!(prompt.contains("**URL**: https://site4.com"));
        assert!(!prompt.contains("**URL**: https://site5.com"));
        assert!(prompt.contains(&format!("{}...", "é".repeat(500))));
        assert!(!prompt.contains(&"é".repeat(501)));
    }

    #[test]
    fn test_follow_up_prompt_lists_gaps() {
        let analysis = AnalysisResult {
            key_findings: vec!["qubits are fragile".into()],
            gaps: vec!["error correction".into()],
            ..Default::default()
        };

        let prompt = AnalysisPrompts::follow_up("quantum computing", &analysis);

        assert!(prompt.contains("quantum computing"));
        assert!(prompt.contains("\"error correction\""));
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn test_synthesis_prompt_caps_findings() {
        let round = ResearchRound {
            round_number: 1,
            queries: vec!["a".into(), "b".into()],
            search_results: Vec::new(),
            extracted_contents: ContentMap::new(),
            analysis: AnalysisResult {
                key_findings: (0..7).map(|i| format!("finding {}", i)).collect(),
                ..Default::default()
            },
        };

        let prompt = AnalysisPrompts::synthesis("topic", &[round]);

        assert!(prompt.contains("**Queries**: a, b"));
        assert!(prompt.contains("- finding 4"));
        assert!(!prompt.contains("- finding 5"));
        assert!(prompt.contains("## References"));
    }

    #[test]
    fn test_char_prefix() {
        assert_eq!(char_prefix("héllo", 2), "hé");
        assert_eq!(char_prefix("hi", 10), "hi");
    }
}
