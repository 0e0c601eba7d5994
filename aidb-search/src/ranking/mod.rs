//! Keyword ranking: tokenize the query, score every record, rank.
//!
//! A small weighted lexical scorer. No IDF, no length normalisation, no
//! fuzzy matching: a record either matches every query term or is dropped.

pub mod scoring;
pub mod search;
pub mod tokenize;
