//! Weighted tier scoring of a record against query terms.
//!
//! Each term is matched against the lower-cased record id and provider id:
//!
//! | tier            | condition                                    | weight |
//! |-----------------|----------------------------------------------|--------|
//! | `IdSubstring`   | term is a substring of the id                | 10     |
//! | `ProviderSubstring` | term is a substring of the provider id   | 6      |
//! | `IdWord`        | neither above; term inside a word of the id  | 3      |
//! | `ProviderWord`  | none above; term inside a provider-id word   | 1      |
//!
//! The two substring tiers are checked independently and both may fire for
//! one term. The word tiers are fallbacks and only the first one that
//! matches is counted. A record scores only if every term matched some tier.

use super::tokenize::split_into_words;
use crate::engine::Rankable;

/// Match strength of one term against one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchTier {
    /// Term is a substring of the record id.
    IdSubstring,
    /// Term is a substring of the provider id.
    ProviderSubstring,
    /// Term is inside one of the id's words.
    IdWord,
    /// Term is inside one of the provider id's words.
    ProviderWord,
}

impl MatchTier {
    /// Score contributed by a match at this tier.
    pub fn weight(&self) -> u32 {
        match self {
            Self::IdSubstring => 10,
            Self::ProviderSubstring => 6,
            Self::IdWord => 3,
            Self::ProviderWord => 1,
        }
    }
}

/// Tiers that fire for `term` against already lower-cased fields.
///
/// Returns an empty vector when the term does not match at all.
pub fn matching_tiers(term: &str, id: &str, provider_id: &str) -> Vec<MatchTier> {
    let mut tiers = Vec::with_capacity(2);
    if id.contains(term) {
        tiers.push(MatchTier::IdSubstring);
    }
    if provider_id.contains(term) {
        tiers.push(MatchTier::ProviderSubstring);
    }
    if tiers.is_empty() {
        if split_into_words(id).any(|word| word.contains(term)) {
            tiers.push(MatchTier::IdWord);
        } else if split_into_words(provider_id).any(|word| word.contains(term)) {
            tiers.push(MatchTier::ProviderWord);
        }
    }
    tiers
}

/// Score `record` against lower-cased query `terms`.
///
/// Returns `0` if any term fails to match (AND semantics) or if there are
/// no terms.
pub fn calculate_score<R: Rankable + ?Sized>(record: &R, terms: &[String]) -> u32 {
    if terms.is_empty() {
        return 0;
    }
    let id = record.record_id().to_lowercase();
    let provider_id = record.provider_id().to_lowercase();

    let mut score = 0;
    for term in terms {
        let tiers = matching_tiers(term, &id, &provider_id);
        if tiers.is_empty() {
            return 0;
        }
        score += tiers.iter().map(MatchTier::weight).sum::<u32>();
    }
    score
}
