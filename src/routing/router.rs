use super::types::{DispatchPlan, PlanEntry, TargetQuery};
use crate::cluster::topology::Topology;
use crate::cluster::types::{ReplicaHandle, ShardId, ShardRouting};
use crate::error::SearchError;
use crate::query::types::Query;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct ShardRouter {
    topology: Arc<dyn Topology>,
    /// Rotation cursor for replica selection when no local copy exists.
    next_replica: AtomicUsize,
}

impl ShardRouter {
    pub fn new(topology: Arc<dyn Topology>) -> Self {
        Self {
            topology,
            next_replica: AtomicUsize::new(rand::random::<u16>() as usize),
        }
    }

    /// Expands every target query over the shards of its index.
    ///
    /// Identical (shard, query) pairs are dispatched once. Entries for the same
    /// shard with different effective queries are all kept.
    pub fn route(&self, targets: &[TargetQuery]) -> Result<DispatchPlan, SearchError> {
        if targets.is_empty() {
            return Err(SearchError::IndexMissing("[]".to_string()));
        }

        let mut entries = Vec::new();
        let mut dispatched: HashMap<ShardId, Vec<Query>> = HashMap::new();

        for target in targets {
            let shards = self.topology.shards_of(&target.index)?;
            for routing in shards {
                let seen = dispatched.entry(routing.shard.clone()).or_default();
                if seen.contains(&target.query) {
                    tracing::trace!(
                        "Skipping duplicate dispatch of {} for target {}",
                        routing.shard,
                        target.target
                    );
                    continue;
                }
                seen.push(target.query.clone());

                let replica = self.select_replica(&routing);
                if replica.is_none() {
                    tracing::warn!("No available replica for shard {}", routing.shard);
                }
                entries.push(PlanEntry {
                    shard: routing.shard,
                    replica,
                    query: target.query.clone(),
                });
            }
        }

        tracing::debug!(
            "Routed {} targets to {} shard requests",
            targets.len(),
            entries.len()
        );
        Ok(DispatchPlan::new(entries))
    }

    fn select_replica(&self, routing: &ShardRouting) -> Option<ReplicaHandle> {
        let local = self.topology.local_node();
        if let Some(replica) = routing.available_replicas().find(|r| &r.node == local) {
            return Some(replica.clone());
        }

        let available: Vec<&ReplicaHandle> = routing.available_replicas().collect();
        if available.is_empty() {
            return None;
        }
        let turn = self.next_replica.fetch_add(1, Ordering::Relaxed);
        Some(available[turn % available.len()].clone())
    }
}
