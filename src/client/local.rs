//! In-process cluster wiring.
//!
//! Every node of the cluster lives in this process and shares one
//! [`ShardStore`]; node state still decides which replicas answer.

use super::capabilities::{AdminOps, DocumentWriter};
use super::client::Client;
use super::types::CreateIndexRequest;
use crate::alias::registry::AliasRegistry;
use crate::alias::types::{AliasAction, AliasMetadata};
use crate::cluster::topology::{ClusterTopology, Topology};
use crate::cluster::types::{IndexSettings, NodeId, NodeState};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::executor::types::ShardQueryExecutor;
use crate::search::coordinator::SearchCoordinator;
use crate::storage::local::LocalShardExecutor;
use crate::storage::memory::ShardStore;
use crate::storage::types::{
    DeleteRequest, DeleteResponse, Document, GetRequest, GetResponse, IndexRequest, IndexResponse,
};

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Index, alias and document state shared by the write and admin paths.
pub struct LocalCluster {
    config: SearchConfig,
    topology: Arc<ClusterTopology>,
    registry: Arc<AliasRegistry>,
    store: Arc<ShardStore>,
}

impl LocalCluster {
    fn default_settings(&self) -> IndexSettings {
        IndexSettings::new(
            self.config.default_number_of_shards,
            self.config.default_number_of_replicas,
        )
    }

    /// The index behind `name`, which may be an alias.
    fn concrete_index(&self, name: &str) -> Result<String, SearchError> {
        let snapshot = self.registry.snapshot();
        if snapshot.indices.contains(name) {
            return Ok(name.to_string());
        }
        snapshot
            .aliases
            .get(name)
            .map(|alias| alias.index.clone())
            .ok_or_else(|| SearchError::IndexMissing(name.to_string()))
    }

    fn create(&self, index: &str, settings: IndexSettings) -> Result<(), SearchError> {
        self.registry.register_index(index)?;
        if let Err(e) = self.topology.create_index(index, settings.clone()) {
            // Keep the registry and the topology in step
            let _ = self.registry.unregister_index(index);
            return Err(e);
        }
        tracing::info!(
            "Created index {} ({} shards, {} replicas)",
            index,
            settings.number_of_shards,
            settings.number_of_replicas
        );
        Ok(())
    }

    /// The index a write lands in, creating it when allowed.
    fn write_index(&self, name: &str) -> Result<String, SearchError> {
        match self.concrete_index(name) {
            Ok(index) => Ok(index),
            Err(SearchError::IndexMissing(_)) if self.config.auto_create_index => {
                match self.create(name, self.default_settings()) {
                    Ok(()) | Err(SearchError::IndexAlreadyExists(_)) => Ok(name.to_string()),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl DocumentWriter for LocalCluster {
    async fn index(&self, request: IndexRequest) -> Result<IndexResponse, SearchError> {
        let index = self.write_index(&request.index)?;
        let id = request.id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let document = Document::new(&index, &request.doc_type, &id, request.source);

        let (version, created) = self.store.put(document)?;
        tracing::debug!("Indexed {}/{}/{} (version {})", index, request.doc_type, id, version);

        Ok(IndexResponse {
            index,
            doc_type: request.doc_type,
            id,
            version,
            created,
        })
    }

    async fn get(&self, request: GetRequest) -> Result<GetResponse, SearchError> {
        let index = self.concrete_index(&request.index)?;
        let stored = self.store.get(&index, &request.doc_type, &request.id)?;

        Ok(GetResponse {
            found: stored.is_some(),
            version: stored.as_ref().map(|s| s.version),
            source: stored.map(|s| s.document.source),
            index,
            doc_type: request.doc_type,
            id: request.id,
        })
    }

    async fn delete(&self, request: DeleteRequest) -> Result<DeleteResponse, SearchError> {
        let index = self.concrete_index(&request.index)?;
        let found = self.store.delete(&index, &request.doc_type, &request.id)?;
        tracing::debug!("Deleted {}/{}/{} (found: {})", index, request.doc_type, request.id, found);

        Ok(DeleteResponse {
            index,
            doc_type: request.doc_type,
            id: request.id,
            found,
        })
    }
}

#[async_trait]
impl AdminOps for LocalCluster {
    async fn create_index(&self, request: CreateIndexRequest) -> Result<(), SearchError> {
        let settings = request.settings.unwrap_or_else(|| self.default_settings());
        self.create(&request.index, settings)?;

        if !request.aliases.is_empty() {
            let actions: Vec<AliasAction> = request
                .aliases
                .into_iter()
                .map(|(alias, filter)| AliasAction::add(&request.index, alias, filter))
                .collect();
            if let Err(e) = self.registry.apply(&actions) {
                // The index only exists together with its aliases
                let _ = self.registry.unregister_index(&request.index);
                let _ = self.topology.delete_index(&request.index);
                tracing::warn!("Rolled back index {}: {}", request.index, e);
                return Err(e);
            }
        }
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<(), SearchError> {
        self.registry.unregister_index(index)?;
        self.topology.delete_index(index)?;
        self.store.drop_index(index);
        tracing::info!("Deleted index {}", index);
        Ok(())
    }

    async fn update_aliases(&self, actions: Vec<AliasAction>) -> Result<u64, SearchError> {
        self.registry.apply(&actions)
    }

    async fn get_aliases(&self, index: &str) -> Result<Vec<AliasMetadata>, SearchError> {
        let snapshot = self.registry.snapshot();
        if !snapshot.indices.contains(index) {
            return Err(SearchError::IndexMissing(index.to_string()));
        }
        Ok(snapshot.aliases_of(index))
    }
}

/// A whole cluster running inside this process.
pub struct LocalNode {
    cluster: Arc<LocalCluster>,
    coordinator: Arc<SearchCoordinator>,
}

impl LocalNode {
    /// Wires a cluster of `config.node_count` nodes served by [`LocalShardExecutor`].
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        Self::with_executor(config, |store| -> Arc<dyn ShardQueryExecutor> {
            Arc::new(LocalShardExecutor::new(store))
        })
    }

    /// Like [`LocalNode::new`], with the shard executor built by `executor`.
    pub fn with_executor<F>(config: SearchConfig, executor: F) -> Result<Self, SearchError>
    where
        F: FnOnce(Arc<ShardStore>) -> Arc<dyn ShardQueryExecutor>,
    {
        config.validate()?;

        // 1. Topology:
        let topology = Arc::new(ClusterTopology::with_nodes(config.node_count));
        tracing::info!(
            "Starting local cluster with {} nodes (local node {})",
            config.node_count,
            topology.local_node()
        );

        // 2. Storage layer:
        let registry = Arc::new(AliasRegistry::new());
        let store = Arc::new(ShardStore::new(topology.clone()));

        // 3. Query path:
        let coordinator = Arc::new(SearchCoordinator::new(
            config.clone(),
            registry.clone(),
            topology.clone(),
            executor(store.clone()),
            store.clone(),
            store.clone(),
        ));

        let cluster = Arc::new(LocalCluster {
            config,
            topology,
            registry,
            store,
        });
        Ok(Self {
            cluster,
            coordinator,
        })
    }

    pub fn client(&self) -> Client {
        Client::new(
            self.cluster.clone(),
            self.coordinator.clone(),
            self.cluster.clone(),
        )
    }

    pub fn coordinator(&self) -> &Arc<SearchCoordinator> {
        &self.coordinator
    }

    pub fn topology(&self) -> &Arc<ClusterTopology> {
        &self.cluster.topology
    }

    pub fn registry(&self) -> &Arc<AliasRegistry> {
        &self.cluster.registry
    }

    pub fn store(&self) -> &Arc<ShardStore> {
        &self.cluster.store
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.cluster.topology.node_ids()
    }

    /// Marks a node alive, suspect or dead; replicas on non-alive nodes stop answering.
    pub fn set_node_state(&self, node: &NodeId, state: NodeState) -> Result<(), SearchError> {
        if !self.cluster.topology.set_node_state(node, state) {
            return Err(SearchError::InvalidRequest(format!("unknown node {}", node)));
        }
        Ok(())
    }
}
