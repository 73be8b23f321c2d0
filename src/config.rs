//! Configuration for a search node
//!
//! Every field has a default so a partial JSON document (or none at all) yields a
//! usable configuration. Call [`SearchConfig::validate`] before wiring components.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Defaults applied to more-like-this requests that leave a parameter unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MltDefaults {
    /// Minimum occurrences of a term inside the source field.
    pub min_term_freq: u32,
    /// Minimum number of documents in the index containing the term.
    pub min_doc_freq: u64,
    /// Upper bound on the number of clauses in a derived query.
    pub max_query_terms: usize,
    pub min_word_len: usize,
    /// Zero means unbounded.
    pub max_word_len: usize,
    /// Fraction of derived clauses a hit has to match.
    pub percent_terms_to_match: f32,
}

impl Default for MltDefaults {
    fn default() -> Self {
        Self {
            min_term_freq: 2,
            min_doc_freq: 5,
            max_query_terms: 25,
            min_word_len: 0,
            max_word_len: 0,
            percent_terms_to_match: 0.3,
        }
    }
}

/// Node-wide settings for routing, dispatch and index defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_number_of_shards: u32,
    pub default_number_of_replicas: u32,
    /// Maximum shard requests in flight for one search.
    pub max_in_flight: usize,
    /// Per-shard deadline used when a request does not carry its own timeout.
    pub default_timeout_ms: u64,
    pub default_size: usize,
    /// Indexing into an unknown index creates it with the default settings.
    pub auto_create_index: bool,
    /// Number of nodes in an in-process cluster.
    pub node_count: usize,
    pub mlt: MltDefaults,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_number_of_shards: 5,
            default_number_of_replicas: 1,
            max_in_flight: 32,
            default_timeout_ms: 30_000,
            default_size: 10,
            auto_create_index: true,
            node_count: 1,
            mlt: MltDefaults::default(),
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a (possibly partial) JSON document on top of the defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SearchError> {
        let config: SearchConfig = serde_json::from_str(json)
            .map_err(|e| SearchError::config_error("json", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_number_of_shards(mut self, shards: u32) -> Self {
        self.default_number_of_shards = shards;
        self
    }

    pub fn default_number_of_replicas(mut self, replicas: u32) -> Self {
        self.default_number_of_replicas = replicas;
        self
    }

    pub fn max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn default_size(mut self, size: usize) -> Self {
        self.default_size = size;
        self
    }

    pub fn auto_create_index(mut self, enabled: bool) -> Self {
        self.auto_create_index = enabled;
        self
    }

    pub fn node_count(mut self, nodes: usize) -> Self {
        self.node_count = nodes;
        self
    }

    pub fn mlt(mut self, mlt: MltDefaults) -> Self {
        self.mlt = mlt;
        self
    }

    pub fn default_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.default_number_of_shards == 0 {
            return Err(SearchError::config_error(
                "default_number_of_shards",
                "must be greater than 0",
            ));
        }
        if self.max_in_flight == 0 {
            return Err(SearchError::config_error(
                "max_in_flight",
                "must be greater than 0",
            ));
        }
        if self.default_timeout_ms == 0 {
            return Err(SearchError::config_error(
                "default_timeout_ms",
                "must be greater than 0",
            ));
        }
        if self.node_count == 0 {
            return Err(SearchError::config_error(
                "node_count",
                "a cluster needs at least one node",
            ));
        }
        if !(0.0..=1.0).contains(&self.mlt.percent_terms_to_match) {
            return Err(SearchError::config_error(
                "mlt.percent_terms_to_match",
                format!(
                    "{} is outside the range 0.0..=1.0",
                    self.mlt.percent_terms_to_match
                ),
            ));
        }
        if self.mlt.max_query_terms == 0 {
            return Err(SearchError::config_error(
                "mlt.max_query_terms",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}
