//! Parse aggregation output into an Insight Document
//!
//! Three steps, always in this order: strip a surrounding code fence, parse
//! the rest as the document, and on failure wrap the raw response text as
//! the executive summary. Parsing never fails.

use serde::{Deserialize, Serialize};
use vantage_domain::InsightDocument;

/// How a response became a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseOutcome {
    /// The response was a valid document
    Parsed,

    /// The response was wrapped as the executive summary
    Fallback,
}

/// Remove a surrounding Markdown code fence, if any
///
/// # Examples
///
/// ```
/// use vantage_synthesizer::strip_code_fence;
///
/// assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
/// assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
/// ```
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Opening line may carry a language tag
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Turn an aggregation response into a document
///
/// # Examples
///
/// ```
/// use vantage_domain::InsightDocument;
/// use vantage_synthesizer::{parse_insight_response, ParseOutcome};
///
/// let (doc, outcome) = parse_insight_response("not a json document");
/// assert_eq!(outcome, ParseOutcome::Fallback);
/// assert_eq!(doc, InsightDocument::summary_only("not a json document"));
/// ```
pub fn parse_insight_response(response: &str) -> (InsightDocument, ParseOutcome) {
    match serde_json::from_str::<InsightDocument>(strip_code_fence(response)) {
        Ok(document) => (document, ParseOutcome::Parsed),
        Err(_) => (InsightDocument::summary_only(response), ParseOutcome::Fallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{"executive_summary": "Users prefer the competitor's mask.",
        "recommendations_for_product_manager": ["Offer a pediatric mask"]}"#;

    #[test]
    fn test_plain_json() {
        let (doc, outcome) = parse_insight_response(DOC);
        assert_eq!(outcome, ParseOutcome::Parsed);
        assert_eq!(doc.executive_summary, "Users prefer the competitor's mask.");
    }

    #[test]
    fn test_fenced_json() {
        let fenced = format!("```json\n{}\n```", DOC);
        let (doc, outcome) = parse_insight_response(&fenced);
        assert_eq!(outcome, ParseOutcome::Parsed);
        assert_eq!(
            doc.recommendations_for_product_manager,
            Some(vec!["Offer a pediatric mask".to_string()])
        );
    }

    #[test]
    fn test_bare_fence_and_single_line_fence() {
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```json {} ```"), "{}");
        assert_eq!(strip_code_fence("```json\n{}"), "{}");
    }

    #[test]
    fn test_null_section_values_still_parse() {
        let (doc, outcome) = parse_insight_response(
            r#"{"executive_summary": "ok", "regulatory_notes": {"FDA": null},
                "recommendations_for_product_manager": ["Offer a pediatric mask"]}"#,
        );
        assert_eq!(outcome, ParseOutcome::Parsed);
        assert!(!doc.is_summary_only());
    }

    #[test]
    fn test_fallback_keeps_raw_text() {
        let raw = "```json\n{\"executive_summary\": \n```";
        let (doc, outcome) = parse_insight_response(raw);
        assert_eq!(outcome, ParseOutcome::Fallback);
        assert_eq!(doc.executive_summary, raw);
        assert!(doc.is_summary_only());
    }

    #[test]
    fn test_json_without_summary_falls_back() {
        let (doc, outcome) = parse_insight_response(r#"{"insights": []}"#);
        assert_eq!(outcome, ParseOutcome::Fallback);
        assert_eq!(doc.executive_summary, r#"{"insights": []}"#);
    }

    #[test]
    fn test_fallback_document_shape() {
        let (doc, _) = parse_insight_response("not a json document");
        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({"executive_summary": "not a json document"}));
    }
}
