use super::types::{IndexSettings, Node, NodeId, NodeState, ReplicaHandle, ShardId, ShardRouting};
use crate::error::SearchError;

use dashmap::DashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Source of shard placement consumed by the router.
pub trait Topology: Send + Sync {
    /// Every shard of `index` in shard order, each with its replica handles.
    fn shards_of(&self, index: &str) -> Result<Vec<ShardRouting>, SearchError>;

    /// The node the router runs on; replicas hosted here are preferred.
    fn local_node(&self) -> &NodeId;
}

/// In-process view of the cluster: members, indices and their placement.
pub struct ClusterTopology {
    local_node: NodeId,
    nodes: Arc<DashMap<NodeId, Node>>,
    indices: Arc<DashMap<String, IndexSettings>>,
}

impl ClusterTopology {
    /// Creates a single-node cluster.
    pub fn new(local_node: NodeId) -> Self {
        let nodes = Arc::new(DashMap::new());
        nodes.insert(
            local_node.clone(),
            Node {
                id: local_node.clone(),
                state: NodeState::Alive,
            },
        );
        Self {
            local_node,
            nodes,
            indices: Arc::new(DashMap::new()),
        }
    }

    /// Creates a cluster of `node_count` alive nodes named `node-0..`; `node-0` is local.
    pub fn with_nodes(node_count: usize) -> Self {
        let topology = Self::new(NodeId("node-0".to_string()));
        for i in 1..node_count {
            topology.add_node(NodeId(format!("node-{}", i)));
        }
        topology
    }

    pub fn add_node(&self, id: NodeId) {
        tracing::info!("Node {} joined the topology", id);
        self.nodes.insert(
            id.clone(),
            Node {
                id,
                state: NodeState::Alive,
            },
        );
    }

    pub fn set_node_state(&self, id: &NodeId, state: NodeState) -> bool {
        match self.nodes.get_mut(id) {
            Some(mut node) => {
                tracing::info!("Node {} is now {:?}", id, state);
                node.state = state;
                true
            }
            None => false,
        }
    }

    pub fn node_state(&self, id: &NodeId) -> Option<NodeState> {
        self.nodes.get(id).map(|node| node.state.clone())
    }

    pub fn is_alive(&self, id: &NodeId) -> bool {
        matches!(self.node_state(id), Some(NodeState::Alive))
    }

    /// Node ids in placement order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn create_index(&self, name: &str, settings: IndexSettings) -> Result<(), SearchError> {
        if settings.number_of_shards == 0 {
            return Err(SearchError::InvalidRequest(format!(
                "index [{}] needs at least one shard",
                name
            )));
        }
        match self.indices.entry(name.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(SearchError::IndexAlreadyExists(name.to_string()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                tracing::info!(
                    "Created index {} with {} shards and {} replicas",
                    name,
                    settings.number_of_shards,
                    settings.number_of_replicas
                );
                slot.insert(settings);
                Ok(())
            }
        }
    }

    pub fn delete_index(&self, name: &str) -> Result<IndexSettings, SearchError> {
        self.indices
            .remove(name)
            .map(|(_, settings)| settings)
            .ok_or_else(|| SearchError::IndexMissing(name.to_string()))
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    pub fn index_settings(&self, name: &str) -> Option<IndexSettings> {
        self.indices.get(name).map(|entry| entry.value().clone())
    }

    /// The shard a document id is stored on.
    pub fn shard_for_document(&self, index: &str, id: &str) -> Result<ShardId, SearchError> {
        let settings = self
            .index_settings(index)
            .ok_or_else(|| SearchError::IndexMissing(index.to_string()))?;
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        let hash = hasher.finish() as u32;
        Ok(ShardId::new(index, hash % settings.number_of_shards))
    }

    /// Nodes holding `shard`: the primary first, then up to `replicas` distinct followers.
    pub fn owners(&self, shard: u32, replicas: u32) -> Vec<NodeId> {
        let node_ids = self.node_ids();
        if node_ids.is_empty() {
            return vec![];
        }
        let copies = (replicas as usize + 1).min(node_ids.len());
        let primary_idx = shard as usize % node_ids.len();
        (0..copies)
            .map(|offset| node_ids[(primary_idx + offset) % node_ids.len()].clone())
            .collect()
    }
}

impl Topology for ClusterTopology {
    fn shards_of(&self, index: &str) -> Result<Vec<ShardRouting>, SearchError> {
        let settings = self
            .index_settings(index)
            .ok_or_else(|| SearchError::IndexMissing(index.to_string()))?;

        Ok((0..settings.number_of_shards)
            .map(|shard| {
                let shard_id = ShardId::new(index, shard);
                let replicas = self
                    .owners(shard, settings.number_of_replicas)
                    .into_iter()
                    .enumerate()
                    .map(|(position, node)| ReplicaHandle {
                        shard: shard_id.clone(),
                        available: self.is_alive(&node),
                        node,
                        primary: position == 0,
                    })
                    .collect();
                ShardRouting {
                    shard: shard_id,
                    replicas,
                }
            })
            .collect())
    }

    fn local_node(&self) -> &NodeId {
        &self.local_node
    }
}
