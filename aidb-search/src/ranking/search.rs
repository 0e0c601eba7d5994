//! Rank a consolidated index against a query.
//!
//! Scores every record, drops non-matching ones, stable-sorts by score
//! descending (ties keep index order) and truncates to the limit.

use super::scoring::calculate_score;
use super::tokenize::query_terms;
use crate::engine::Rankable;

/// A record together with the score it earned.
#[derive(Debug)]
pub struct Scored<'a, R> {
    pub record: &'a R,
    pub score: u32,
}

/// Search `records` for `query`, returning at most `limit` matches.
///
/// A blank query returns the first `limit` records unchanged, without
/// scoring. `records` is never reordered or mutated.
pub fn search_records<'a, R: Rankable>(records: &'a [R], query: &str, limit: usize) -> Vec<&'a R> {
    if query.trim().is_empty() {
        return records.iter().take(limit).collect();
    }
    rank(records, query, limit)
        .into_iter()
        .map(|scored| scored.record)
        .collect()
}

/// Like [`search_records`] for non-blank queries, but keeps the scores.
pub fn rank<'a, R: Rankable>(records: &'a [R], query: &str, limit: usize) -> Vec<Scored<'a, R>> {
    let terms = query_terms(query);
    tracing::trace!(terms = terms.len(), candidates = records.len(), "ranking");

    let mut matches: Vec<Scored<'a, R>> = records
        .iter()
        .filter_map(|record| {
            let score = calculate_score(record, &terms);
            (score > 0).then_some(Scored { record, score })
        })
        .collect();

    // `sort_by` is stable: equal scores stay in index order.
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches.truncate(limit);
    matches
}
