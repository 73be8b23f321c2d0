//! More-Like-This Query Derivation
//!
//! Turns a reference document into a disjunctive query over its significant terms.
//!
//! ## Term selection
//! 1. Every requested field of the source is tokenized; the local term frequency is
//!    the number of occurrences inside that field.
//! 2. Terms below `min_term_freq`, outside the word length bounds, or listed as stop
//!    words are dropped.
//! 3. The document frequency of each remaining term is read from the statistics
//!    collaborator; terms below `min_doc_freq` (or above `max_doc_freq`) are dropped.
//! 4. Survivors are ranked by `tf * idf` and the best `max_query_terms` become one
//!    `should` clause each, boosted by their local term frequency.
//!
//! A document without surviving terms yields [`Query::MatchNone`], never an error.

use super::tokenizer::term_frequencies;
use super::types::{ALL_FIELDS, BoolQuery, Query};
use crate::config::MltDefaults;
use crate::storage::traits::TermStatistics;
use crate::storage::types::Document;

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Fully resolved term selection parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MltParameters {
    /// Flattened field paths to draw terms from; empty means every field of the source.
    pub fields: Vec<String>,
    pub min_term_freq: u32,
    pub min_doc_freq: u64,
    pub max_doc_freq: Option<u64>,
    pub max_query_terms: usize,
    pub min_word_len: usize,
    /// Zero means unbounded.
    pub max_word_len: usize,
    pub stop_words: BTreeSet<String>,
    /// Extra multiplier on the term frequency weight of every clause.
    pub boost_terms: Option<f32>,
    pub percent_terms_to_match: f32,
}

impl MltParameters {
    pub fn from_defaults(defaults: &MltDefaults) -> Self {
        Self {
            fields: vec![],
            min_term_freq: defaults.min_term_freq,
            min_doc_freq: defaults.min_doc_freq,
            max_doc_freq: None,
            max_query_terms: defaults.max_query_terms,
            min_word_len: defaults.min_word_len,
            max_word_len: defaults.max_word_len,
            stop_words: BTreeSet::new(),
            boost_terms: None,
            percent_terms_to_match: defaults.percent_terms_to_match,
        }
    }

    fn accepts_word(&self, term: &str) -> bool {
        let len = term.chars().count();
        if self.min_word_len > 0 && len < self.min_word_len {
            return false;
        }
        if self.max_word_len > 0 && len > self.max_word_len {
            return false;
        }
        !self.stop_words.contains(term)
    }

    fn accepts_doc_freq(&self, df: u64) -> bool {
        df >= self.min_doc_freq && self.max_doc_freq.is_none_or(|max| df <= max)
    }
}

impl Default for MltParameters {
    fn default() -> Self {
        Self::from_defaults(&MltDefaults::default())
    }
}

/// A retained term with the statistics it was ranked by.
#[derive(Debug, Clone, PartialEq)]
pub struct TermCandidate {
    pub field: String,
    pub term: String,
    pub term_freq: u32,
    pub doc_freq: u64,
    pub score: f64,
}

pub struct MoreLikeThisQueryBuilder {
    stats: Arc<dyn TermStatistics>,
}

impl MoreLikeThisQueryBuilder {
    pub fn new(stats: Arc<dyn TermStatistics>) -> Self {
        Self { stats }
    }

    /// Derives the query for `source`, reading document frequencies from `index`.
    pub async fn build(&self, source: &Document, index: &str, params: &MltParameters) -> Query {
        let candidates = self.select_terms(source, index, params).await;

        if candidates.is_empty() {
            tracing::debug!(
                "No eligible terms in {}/{}/{}, more-like-this matches nothing",
                source.index,
                source.doc_type,
                source.id
            );
            return Query::MatchNone;
        }

        tracing::debug!(
            "Derived {} terms from {}/{}/{}",
            candidates.len(),
            source.index,
            source.doc_type,
            source.id
        );

        let weight = params.boost_terms.unwrap_or(1.0);
        let should: Vec<Query> = candidates
            .iter()
            .map(|c| Query::term_with_boost(&c.field, &c.term, c.term_freq as f32 * weight))
            .collect();
        let required = ((should.len() as f32 * params.percent_terms_to_match).floor() as usize).max(1);

        Query::Bool(BoolQuery {
            should,
            minimum_should_match: Some(required),
            ..BoolQuery::default()
        })
    }

    /// Ranked terms that pass every frequency and word filter.
    pub async fn select_terms(
        &self,
        source: &Document,
        index: &str,
        params: &MltParameters,
    ) -> Vec<TermCandidate> {
        let flattened = source.text_fields();
        let fields: Vec<String> = if params.fields.is_empty() {
            flattened.keys().cloned().collect()
        } else {
            params.fields.clone()
        };

        let num_docs = self.stats.document_count(index).await;
        let mut candidates = Vec::new();

        for field in fields {
            let values: Vec<String> = if field == ALL_FIELDS {
                flattened.values().flatten().cloned().collect()
            } else {
                flattened.get(&field).cloned().unwrap_or_default()
            };

            for (term, term_freq) in term_frequencies(values.iter()) {
                if term_freq < params.min_term_freq || !params.accepts_word(&term) {
                    continue;
                }
                let doc_freq = self.stats.document_frequency(index, &field, &term).await;
                if !params.accepts_doc_freq(doc_freq) {
                    continue;
                }
                let idf = ((num_docs as f64 + 1.0) / (doc_freq as f64 + 1.0)).ln() + 1.0;
                candidates.push(TermCandidate {
                    field: field.clone(),
                    term,
                    term_freq,
                    doc_freq,
                    score: term_freq as f64 * idf,
                });
            }
        }

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.field.cmp(&b.field))
                .then_with(|| a.term.cmp(&b.term))
        });
        candidates.truncate(params.max_query_terms);
        candidates
    }
}
