//! Lexical relevance scoring shared by the storage backends.
//!
//! A query is a handful of phrases sampled from a candidate document. Each
//! stored article is scored in `[0, 3]`: twice the fraction of distinct query
//! terms it contains, plus the fraction of phrases it contains verbatim
//! (case- and whitespace-insensitive). A verbatim copy scores 3.0.

use std::collections::HashSet;

use ab_core::TextQuery;

const MIN_TERM_LEN: usize = 3;

const STOPWORDS: &[&str] = &[
    "about", "after", "all", "also", "and", "any", "are", "been", "but", "can", "for", "from",
    "has", "have", "how", "into", "its", "more", "most", "not", "one", "our", "out", "than",
    "that", "the", "their", "them", "then", "there", "these", "they", "this", "was", "were",
    "what", "when", "which", "who", "why", "will", "with", "you", "your",
];

pub const MAX_RELEVANCE: f64 = 3.0;

/// Lowercased content-bearing tokens of `text`.
pub fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TERM_LEN)
        .map(str::to_lowercase)
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

pub fn relevance(query: &TextQuery, title: &str, content: &str) -> f64 {
    let query_terms: HashSet<String> = query.phrases.iter().flat_map(|p| terms(p)).collect();
    if query_terms.is_empty() {
        return 0.0;
    }

    let document_terms: HashSet<String> = terms(title).chain(terms(content)).collect();
    let matched = query_terms.iter().filter(|t| document_terms.contains(*t)).count();
    let coverage = matched as f64 / query_terms.len() as f64;

    let document = collapse_whitespace(&format!("{}\n{}", title, content));
    let phrase_hits = query
        .phrases
        .iter()
        .filter(|p| document.contains(&collapse_whitespace(p)))
        .count();
    let phrase_ratio = phrase_hits as f64 / query.phrases.len() as f64;

    2.0 * coverage + phrase_ratio
}
