use crate::cluster::types::IndexSettings;
use crate::query::types::Query;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIndexRequest {
    pub index: String,
    /// Falls back to the node's default shard and replica counts.
    pub settings: Option<IndexSettings>,
    /// Aliases created together with the index, each with an optional filter.
    #[serde(default)]
    pub aliases: Vec<(String, Option<Query>)>,
}

impl CreateIndexRequest {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            settings: None,
            aliases: vec![],
        }
    }

    pub fn settings(mut self, number_of_shards: u32, number_of_replicas: u32) -> Self {
        self.settings = Some(IndexSettings::new(number_of_shards, number_of_replicas));
        self
    }

    pub fn alias(mut self, alias: impl Into<String>, filter: Option<Query>) -> Self {
        self.aliases.push((alias.into(), filter));
        self
    }
}
