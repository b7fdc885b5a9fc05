//! Defensive handling of model output
//!
//! Model responses are untrusted text. Everything here degrades to a usable
//! value instead of failing.

use std::collections::BTreeSet;

use crate::research::state::{AnalysisResult, ResearchRound};

/// Follow-up queries kept per round
pub const MAX_FOLLOW_UP_QUERIES: usize = 3;

/// Strip a surrounding Markdown code fence (```` ```json ```` or ```` ``` ````)
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse an analysis object, falling back to the raw text as the summary
pub fn parse_analysis(raw: &str) -> AnalysisResult {
    let body = strip_code_fences(raw);
    serde_json::from_str(body).unwrap_or_else(|_| AnalysisResult::from_raw_text(body))
}

/// Parse a JSON array of queries; `None` when the response is not one
pub fn parse_queries(raw: &str) -> Option<Vec<String>> {
    let queries: Vec<String> = serde_json::from_str(strip_code_fences(raw)).ok()?;
    Some(
        queries
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .take(MAX_FOLLOW_UP_QUERIES)
            .collect(),
    )
}

/// Heading titles that open a reference list
const REFERENCE_TITLES: &[&str] = &["references", "reference", "sources", "bibliography", "citations"];

/// Whether the report already has a references section.
///
/// Only second-level or deeper headings count, and the title itself must
/// name the list ("References", "Sources and further reading",
/// "参考来源 (References)"). A title that merely contains the word, such as
/// "Open Source Databases" or "Resources Needed", does not.
pub fn has_references_heading(report: &str) -> bool {
    report.lines().any(|line| {
        let line = line.trim_start();
        let level = line.chars().take_while(|c| *c == '#').count();
        if level < 2 {
            return false;
        }

        let title = line[level..].trim().to_lowercase();
        if title.starts_with("参考") {
            return true;
        }

        let words: Vec<&str> = title
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let opens = words.first().is_some_and(|w| REFERENCE_TITLES.contains(w));
        let closes = words.last() == Some(&"references");
        opens || closes
    })
}

/// Append a numbered References section listing `sources` in order
pub fn append_references(report: &mut String, sources: &BTreeSet<String>) {
    report.push_str("\n\n## References\n\n");
    for (i, url) in sources.iter().enumerate() {
        report.push_str(&format!("{}. {}\n", i + 1, url));
    }
}

/// Minimal report built from each round's summary, used when synthesis fails
pub fn fallback_report(topic: &str, rounds: &[ResearchRound]) -> String {
    let mut report = format!("# {}\n\n## Research Summary\n\n", topic);
    for (i, round) in rounds.iter().enumerate() {
        let summary = if round.analysis.summary.trim().is_empty() {
            "No summary available"
        } else {
            round.analysis.summary.as_str()
        };
        report.push_str(&format!("### Round {}\n{}\n\n", i + 1, summary));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::state::ContentMap;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_analysis_valid_json() {
        let raw = r#"```json
{"key_findings": ["f1", "f2"], "summary": "s", "topics": ["t"], "gaps": ["g"]}
```"#;
        let analysis = parse_analysis(raw);

        assert_eq!(analysis.key_findings, vec!["f1", "f2"]);
        assert_eq!(analysis.summary, "s");
        assert_eq!(analysis.gaps, vec!["g"]);
    }

    #[test]
    fn test_parse_analysis_malformed_falls_back() {
        let analysis = parse_analysis("The model rambled instead of JSON");

        assert_eq!(analysis.summary, "The model rambled instead of JSON");
        assert_eq!(analysis.key_findings, vec!["The model rambled instead of JSON"]);
        assert!(analysis.topics.is_empty());
        assert!(analysis.gaps.is_empty());
    }

    #[test]
    fn test_parse_analysis_non_object_falls_back() {
        let analysis = parse_analysis("[1, 2, 3]");
        assert_eq!(analysis.summary, "[1, 2, 3]");
    }

    #[test]
    fn test_parse_queries() {
        assert_eq!(
            parse_queries(r#"["a", " b ", "", "c", "d"]"#),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert_eq!(parse_queries("```json\n[]\n```"), Some(Vec::new()));
        assert_eq!(parse_queries("1. a\n2. b"), None);
    }

    #[test]
    fn test_has_references_heading() {
        assert!(has_references_heading("# T\n\n## References\n1. x"));
        assert!(has_references_heading("# T\n\n### Sources"));
        assert!(has_references_heading("## 参考来源 (References)"));
        assert!(!has_references_heading("# T\n\nSee the references below."));
    }

    #[test]
    fn test_heading_mentioning_source_is_not_references() {
        assert!(!has_references_heading("# Open Source Databases\n\n## Overview\n\nText."));
        assert!(!has_references_heading("# T\n\n## Resources Needed\n\n- time"));
        assert!(!has_references_heading("# T\n\n## Open-source alternatives"));
        // A top-level title is the report name, never the reference list
        assert!(!has_references_heading("# Sources of Funding\n\nText."));
        assert!(has_references_heading("# T\n\n## Sources and Further Reading"));
        assert!(!has_references_heading("# T\n\n## Renewable Energy Sources"));
    }

    #[test]
    fn test_append_references_sorted() {
        let sources: BTreeSet<String> = ["b.com", "a.com"].iter().map(|s| s.to_string()).collect();
        let mut report = "# Report".to_string();

        append_references(&mut report, &sources);

        assert_eq!(report, "# Report\n\n## References\n\n1. a.com\n2. b.com\n");
    }

    #[test]
    fn test_fallback_report() {
        let round = |n: usize, summary: &str| ResearchRound {
            round_number: n,
            queries: vec!["q".into()],
            search_results: Vec::new(),
            extracted_contents: ContentMap::new(),
            analysis: AnalysisResult {
                summary: summary.into(),
                ..Default::default()
            },
        };

        let report = fallback_report("Topic", &[round(1, "first"), round(2, "")]);

        assert_eq!(
            report,
            "# Topic\n\n## Research Summary\n\n### Round 1\nfirst\n\n### Round 2\nNo summary available\n\n"
        );
    }
}
