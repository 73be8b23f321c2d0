use super::scoring::AnalyzedDocument;
use super::traits::{IndexStore, TermStatistics};
use super::types::{Document, StoredDocument};
use crate::cluster::topology::ClusterTopology;
use crate::cluster::types::ShardId;
use crate::error::SearchError;

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// (type, id) of a document within its shard.
type DocKey = (String, String);

/// In-memory documents of every shard, partitioned by [`ShardId`].
///
/// All copies of a shard share this store; replicas differ only in the node that
/// serves them.
pub struct ShardStore {
    local_data: Arc<DashMap<ShardId, DashMap<DocKey, StoredDocument>>>,
    topology: Arc<ClusterTopology>,
}

impl ShardStore {
    pub fn new(topology: Arc<ClusterTopology>) -> Self {
        Self {
            local_data: Arc::new(DashMap::new()),
            topology,
        }
    }

    pub fn topology(&self) -> &Arc<ClusterTopology> {
        &self.topology
    }

    /// Stores `document` on its shard. Returns the new version and whether it was created.
    pub fn put(&self, document: Document) -> Result<(u64, bool), SearchError> {
        let shard = self
            .topology
            .shard_for_document(&document.index, &document.id)?;
        let partition_map = self
            .local_data
            .entry(shard.clone())
            .or_insert_with(DashMap::new);

        let key = (document.doc_type.clone(), document.id.clone());
        let (version, created) = match partition_map.get(&key) {
            Some(existing) => (existing.version + 1, false),
            None => (1, true),
        };
        partition_map.insert(key, StoredDocument { document, version });

        tracing::debug!("Stored document in shard {} (version {})", shard, version);
        Ok((version, created))
    }

    pub fn get(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
    ) -> Result<Option<StoredDocument>, SearchError> {
        let shard = self.topology.shard_for_document(index, id)?;
        let key = (doc_type.to_string(), id.to_string());
        Ok(self
            .local_data
            .get(&shard)
            .and_then(|partition_map| partition_map.get(&key).map(|entry| entry.value().clone())))
    }

    pub fn delete(&self, index: &str, doc_type: &str, id: &str) -> Result<bool, SearchError> {
        let shard = self.topology.shard_for_document(index, id)?;
        let key = (doc_type.to_string(), id.to_string());
        Ok(self
            .local_data
            .get(&shard)
            .map(|partition_map| partition_map.remove(&key).is_some())
            .unwrap_or(false))
    }

    /// A point-in-time copy of the documents on one shard.
    pub fn documents(&self, shard: &ShardId) -> Vec<Document> {
        self.local_data
            .get(shard)
            .map(|partition_map| {
                partition_map
                    .iter()
                    .map(|entry| entry.value().document.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drops every shard of `index`.
    pub fn drop_index(&self, index: &str) {
        self.local_data.retain(|shard, _| shard.index != index);
    }

    pub fn shard_document_count(&self, shard: &ShardId) -> usize {
        self.local_data.get(shard).map(|map| map.len()).unwrap_or(0)
    }

    pub fn local_shard_count(&self) -> usize {
        self.local_data.len()
    }

    pub fn local_document_count(&self) -> usize {
        self.local_data.iter().map(|entry| entry.value().len()).sum()
    }

    fn index_documents(&self, index: &str) -> Vec<Document> {
        self.local_data
            .iter()
            .filter(|entry| entry.key().index == index)
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .map(|doc| doc.value().document.clone())
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

#[async_trait]
impl IndexStore for ShardStore {
    async fn get_document(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
    ) -> Result<Option<Document>, SearchError> {
        Ok(self.get(index, doc_type, id)?.map(|stored| stored.document))
    }
}

#[async_trait]
impl TermStatistics for ShardStore {
    async fn document_frequency(&self, index: &str, field: &str, term: &str) -> u64 {
        self.index_documents(index)
            .iter()
            .filter(|doc| AnalyzedDocument::new(doc).term_freq(field, term) > 0)
            .count() as u64
    }

    async fn document_count(&self, index: &str) -> u64 {
        self.local_data
            .iter()
            .filter(|entry| entry.key().index == index)
            .map(|entry| entry.value().len() as u64)
            .sum()
    }
}
