//! Query and identifier tokenization.

/// Split a query into lower-cased terms.
///
/// The query is lower-cased, trimmed and split on runs of whitespace.
/// A blank query yields no terms.
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Split an identifier into words on whitespace, `-`, `_` and `.`.
///
/// Empty fragments (from leading, trailing or repeated separators) are
/// dropped.
pub fn split_into_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c.is_whitespace() || matches!(c, '-' | '_' | '.'))
        .filter(|word| !word.is_empty())
}
