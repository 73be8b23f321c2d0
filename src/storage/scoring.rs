//! Query matching and scoring on a single document.
//!
//! The scorer is pluggable; the default one scores a term clause by the square
//! root of its term frequency times the clause boost and sums clause scores.

use crate::query::tokenizer::{normalize_term, tokenize_text};
use crate::query::types::{ALL_FIELDS, BoolQuery, Query};
use crate::storage::types::Document;

use std::collections::BTreeMap;

/// A document with every field already tokenized.
pub struct AnalyzedDocument<'a> {
    pub document: &'a Document,
    tokens: BTreeMap<String, Vec<String>>,
}

impl<'a> AnalyzedDocument<'a> {
    pub fn new(document: &'a Document) -> Self {
        let tokens = document
            .text_fields()
            .into_iter()
            .map(|(field, values)| {
                let tokens = values.iter().flat_map(|v| tokenize_text(v)).collect();
                (field, tokens)
            })
            .collect();
        Self { document, tokens }
    }

    /// Occurrences of `term` in `field`; `_all` counts across every field.
    pub fn term_freq(&self, field: &str, term: &str) -> u32 {
        let count = |tokens: &Vec<String>| tokens.iter().filter(|t| *t == term).count() as u32;
        if field == ALL_FIELDS {
            self.tokens.values().map(count).sum()
        } else {
            self.tokens.get(field).map(count).unwrap_or(0)
        }
    }
}

pub trait Scorer: Send + Sync {
    /// `None` when the document does not match, otherwise its score.
    fn score(&self, query: &Query, doc: &AnalyzedDocument<'_>) -> Option<f32>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TermFrequencyScorer;

impl TermFrequencyScorer {
    fn score_bool(&self, query: &BoolQuery, doc: &AnalyzedDocument<'_>) -> Option<f32> {
        if query.must_not.iter().any(|clause| self.score(clause, doc).is_some()) {
            return None;
        }

        let mut total = 0.0;
        for clause in &query.must {
            total += self.score(clause, doc)?;
        }

        let mut matched = 0;
        for clause in &query.should {
            if let Some(score) = self.score(clause, doc) {
                matched += 1;
                total += score;
            }
        }
        if matched < query.required_should_matches() {
            return None;
        }

        // Only negative clauses matched
        if total == 0.0 {
            total = 1.0;
        }
        Some(total * query.boost)
    }
}

impl Scorer for TermFrequencyScorer {
    fn score(&self, query: &Query, doc: &AnalyzedDocument<'_>) -> Option<f32> {
        match query {
            Query::MatchAll => Some(1.0),
            Query::MatchNone => None,
            Query::Term {
                field,
                value,
                boost,
            } => {
                let term = normalize_term(value)?;
                let tf = doc.term_freq(field, &term);
                (tf > 0).then(|| (tf as f32).sqrt() * boost)
            }
            Query::Ids { values } => values
                .iter()
                .any(|id| *id == doc.document.id)
                .then_some(1.0),
            Query::Type { name } => (*name == doc.document.doc_type).then_some(1.0),
            Query::Bool(bool_query) => self.score_bool(bool_query, doc),
            Query::Filtered { query, filter } => {
                self.score(filter, doc)?;
                self.score(query, doc)
            }
        }
    }
}
