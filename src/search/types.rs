use crate::cluster::types::ShardId;
use crate::config::MltDefaults;
use crate::error::SearchError;
use crate::executor::types::{ShardFailure, ShardFailureKind, ShardHit};
use crate::query::mlt::MltParameters;
use crate::query::types::Query;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Index names, alias names or `_all`; empty means every index.
    pub targets: Vec<String>,
    /// Mapping types to restrict to; empty means all types.
    #[serde(default)]
    pub types: Vec<String>,
    pub query: Query,
    #[serde(default)]
    pub from: usize,
    /// Falls back to the node's default size.
    pub size: Option<usize>,
    /// Per-shard deadline; falls back to the node's default timeout.
    pub timeout: Option<Duration>,
    /// Flattened source fields to return per hit.
    pub fields: Option<Vec<String>>,
}

impl SearchRequest {
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            types: vec![],
            query: Query::MatchAll,
            from: 0,
            size: None,
            timeout: None,
            fields: None,
        }
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn from(mut self, from: usize) -> Self {
        self.from = from;
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountRequest {
    pub targets: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
    pub query: Query,
    pub timeout: Option<Duration>,
}

impl CountRequest {
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            types: vec![],
            query: Query::MatchAll,
            timeout: None,
        }
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }
}

/// Find documents similar to (index, type, id).
///
/// Every unset tuning parameter falls back to the node's [`MltDefaults`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoreLikeThisRequest {
    /// Index (or single-index alias) holding the source document.
    pub index: String,
    pub doc_type: String,
    pub id: String,
    #[serde(default)]
    pub fields: Vec<String>,
    pub min_term_freq: Option<u32>,
    pub min_doc_freq: Option<u64>,
    pub max_doc_freq: Option<u64>,
    pub max_query_terms: Option<usize>,
    pub min_word_len: Option<usize>,
    pub max_word_len: Option<usize>,
    #[serde(default)]
    pub stop_words: Vec<String>,
    pub boost_terms: Option<f32>,
    pub percent_terms_to_match: Option<f32>,
    /// Overrides `index` as the searched targets; the source is still read from `index`.
    pub search_indices: Option<Vec<String>>,
    #[serde(default)]
    pub search_types: Vec<String>,
    #[serde(default)]
    pub search_from: usize,
    pub search_size: Option<usize>,
    pub timeout: Option<Duration>,
}

impl MoreLikeThisRequest {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: "_doc".to_string(),
            id: String::new(),
            fields: vec![],
            min_term_freq: None,
            min_doc_freq: None,
            max_doc_freq: None,
            max_query_terms: None,
            min_word_len: None,
            max_word_len: None,
            stop_words: vec![],
            boost_terms: None,
            percent_terms_to_match: None,
            search_indices: None,
            search_types: vec![],
            search_from: 0,
            search_size: None,
            timeout: None,
        }
    }

    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = doc_type.into();
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn min_term_freq(mut self, min_term_freq: u32) -> Self {
        self.min_term_freq = Some(min_term_freq);
        self
    }

    pub fn min_doc_freq(mut self, min_doc_freq: u64) -> Self {
        self.min_doc_freq = Some(min_doc_freq);
        self
    }

    pub fn max_doc_freq(mut self, max_doc_freq: u64) -> Self {
        self.max_doc_freq = Some(max_doc_freq);
        self
    }

    pub fn max_query_terms(mut self, max_query_terms: usize) -> Self {
        self.max_query_terms = Some(max_query_terms);
        self
    }

    pub fn min_word_len(mut self, min_word_len: usize) -> Self {
        self.min_word_len = Some(min_word_len);
        self
    }

    pub fn max_word_len(mut self, max_word_len: usize) -> Self {
        self.max_word_len = Some(max_word_len);
        self
    }

    pub fn stop_words<I, S>(mut self, stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = stop_words.into_iter().map(Into::into).collect();
        self
    }

    pub fn boost_terms(mut self, boost: f32) -> Self {
        self.boost_terms = Some(boost);
        self
    }

    pub fn percent_terms_to_match(mut self, percent: f32) -> Self {
        self.percent_terms_to_match = Some(percent);
        self
    }

    pub fn search_indices<I, S>(mut self, indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_indices = Some(indices.into_iter().map(Into::into).collect());
        self
    }

    pub fn search_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn search_from(mut self, from: usize) -> Self {
        self.search_from = from;
        self
    }

    pub fn search_size(mut self, size: usize) -> Self {
        self.search_size = Some(size);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The targets searched: `search_indices` when present, else `index` itself.
    pub fn search_targets(&self) -> Vec<String> {
        match &self.search_indices {
            Some(indices) if !indices.is_empty() => indices.clone(),
            _ => vec![self.index.clone()],
        }
    }

    /// Term selection parameters with unset values taken from `defaults`.
    pub fn parameters(&self, defaults: &MltDefaults) -> MltParameters {
        let mut params = MltParameters::from_defaults(defaults);
        params.fields = self.fields.clone();
        if let Some(value) = self.min_term_freq {
            params.min_term_freq = value;
        }
        if let Some(value) = self.min_doc_freq {
            params.min_doc_freq = value;
        }
        params.max_doc_freq = self.max_doc_freq;
        if let Some(value) = self.max_query_terms {
            params.max_query_terms = value;
        }
        if let Some(value) = self.min_word_len {
            params.min_word_len = value;
        }
        if let Some(value) = self.max_word_len {
            params.max_word_len = value;
        }
        params.stop_words = self.stop_words.iter().map(|w| w.to_lowercase()).collect();
        params.boost_terms = self.boost_terms;
        if let Some(value) = self.percent_terms_to_match {
            params.percent_terms_to_match = value;
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub index: String,
    pub doc_type: String,
    pub id: String,
    pub score: f32,
    pub fields: Map<String, Value>,
}

impl From<ShardHit> for SearchHit {
    fn from(hit: ShardHit) -> Self {
        Self {
            index: hit.index,
            doc_type: hit.doc_type,
            id: hit.id,
            score: hit.score,
            fields: hit.fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardFailureInfo {
    pub index: String,
    pub shard: u32,
    pub node: Option<String>,
    pub kind: ShardFailureKind,
    pub reason: String,
}

impl ShardFailureInfo {
    pub fn new(shard: &ShardId, node: Option<String>, failure: &ShardFailure) -> Self {
        Self {
            index: shard.index.clone(),
            shard: shard.shard,
            node,
            kind: failure.kind,
            reason: failure.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub took_ms: u64,
    /// Sum of the matching documents reported by every successful shard.
    pub total_hits: u64,
    pub hits: Vec<SearchHit>,
    pub total_shards: usize,
    pub successful_shards: usize,
    pub failed_shards: usize,
    /// At least one shard settled on its deadline.
    pub timed_out: bool,
    pub shard_failures: Vec<ShardFailureInfo>,
}

impl SearchResponse {
    pub fn hit_ids(&self) -> Vec<&str> {
        self.hits.iter().map(|hit| hit.id.as_str()).collect()
    }

    /// Some shards failed but the response still carries the others' answers.
    pub fn is_degraded(&self) -> bool {
        self.failed_shards > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
    pub total_shards: usize,
    pub successful_shards: usize,
    pub failed_shards: usize,
}

impl From<SearchResponse> for CountResponse {
    fn from(response: SearchResponse) -> Self {
        Self {
            count: response.total_hits,
            total_shards: response.total_shards,
            successful_shards: response.successful_shards,
            failed_shards: response.failed_shards,
        }
    }
}

/// One outcome per request, in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiSearchResponse {
    pub responses: Vec<Result<SearchResponse, SearchError>>,
}
