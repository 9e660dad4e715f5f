//! Choosing which analyses fit in one aggregation call

use crate::config::SelectionPolicy;
use chrono::{DateTime, Utc};
use vantage_domain::Source;

/// One enriched analysis as a candidate for the context
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Source table it came from
    pub source: Source,

    /// Retrieval time of the underlying record, if known
    pub retrieved_at: Option<DateTime<Utc>>,

    /// The analysis text
    pub text: String,
}

/// Analyses chosen for the call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Candidates with non-empty text
    pub available: usize,

    /// Texts in the order they go into the prompt
    pub texts: Vec<String>,
}

impl Selection {
    /// Texts joined by newlines
    pub fn combined(&self) -> String {
        self.texts.join("\n")
    }

    /// Whether nothing was selected
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Order candidates by `policy` and take them while they fit in `budget` characters
///
/// `candidates` must be in table order: sources in configured order, rows in
/// insertion order. Empty texts are never selected. If even the first text
/// is over budget it is cut to the budget, so some context always goes out
/// when any exists.
pub fn select(candidates: Vec<Candidate>, policy: SelectionPolicy, budget: usize) -> Selection {
    let mut ordered: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| !c.text.trim().is_empty())
        .collect();
    let available = ordered.len();

    if policy == SelectionPolicy::MostRecentFirst {
        // Later rows are newer; the stable sort keeps that among equal times
        ordered.reverse();
        ordered.sort_by(|a, b| b.retrieved_at.cmp(&a.retrieved_at));
    }

    let mut texts = Vec::new();
    let mut used = 0;
    for candidate in ordered {
        let len = candidate.text.chars().count();
        let separator = usize::from(!texts.is_empty());
        if used + separator + len > budget {
            if texts.is_empty() {
                texts.push(candidate.text.chars().take(budget).collect());
            }
            break;
        }
        used += separator + len;
        texts.push(candidate.text);
    }

    Selection { available, texts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_domain::parse_timestamp;

    fn candidate(source: Source, at: Option<&str>, text: &str) -> Candidate {
        Candidate {
            source,
            retrieved_at: at.and_then(parse_timestamp),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_table_order_keeps_input_order() {
        let selection = select(
            vec![
                candidate(Source::Reviews, None, "A"),
                candidate(Source::Forum, None, "B"),
            ],
            SelectionPolicy::TableOrder,
            100,
        );
        assert_eq!(selection.combined(), "A\nB");
    }

    #[test]
    fn test_most_recent_first() {
        let selection = select(
            vec![
                candidate(Source::Reviews, Some("2025-01-01"), "old"),
                candidate(Source::Reviews, None, "undated"),
                candidate(Source::Encyclopedia, Some("2025-03-01"), "new"),
                candidate(Source::Reviews, Some("2025-02-01"), "mid"),
            ],
            SelectionPolicy::MostRecentFirst,
            1_000,
        );
        assert_eq!(selection.texts, vec!["new", "mid", "old", "undated"]);
    }

    #[test]
    fn test_undated_rows_newest_insert_first() {
        let selection = select(
            vec![
                candidate(Source::Forum, None, "first"),
                candidate(Source::Forum, None, "second"),
            ],
            SelectionPolicy::MostRecentFirst,
            1_000,
        );
        assert_eq!(selection.texts, vec!["second", "first"]);
    }

    #[test]
    fn test_budget_counts_separators() {
        let candidates = vec![
            candidate(Source::News, None, "aaaa"),
            candidate(Source::News, None, "bbbb"),
        ];
        let exact = select(candidates.clone(), SelectionPolicy::TableOrder, 9);
        assert_eq!(exact.texts.len(), 2);
        let short = select(candidates, SelectionPolicy::TableOrder, 8);
        assert_eq!(short.texts, vec!["aaaa"]);
        assert_eq!(short.available, 2);
    }

    #[test]
    fn test_oversized_first_text_is_cut() {
        let selection = select(
            vec![candidate(Source::News, None, "abcdefgh")],
            SelectionPolicy::TableOrder,
            3,
        );
        assert_eq!(selection.texts, vec!["abc"]);
    }

    #[test]
    fn test_blank_texts_skipped() {
        let selection = select(
            vec![candidate(Source::News, None, "  "), candidate(Source::News, None, "")],
            SelectionPolicy::TableOrder,
            100,
        );
        assert!(selection.is_empty());
        assert_eq!(selection.available, 0);
    }
}
