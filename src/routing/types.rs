use crate::cluster::types::{ReplicaHandle, ShardId};
use crate::query::types::Query;

/// The effective query for one resolved index of a named target.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetQuery {
    /// The name the caller used (index, alias or `_all`).
    pub target: String,
    pub index: String,
    pub query: Query,
}

/// One unit of dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanEntry {
    pub shard: ShardId,
    /// `None` when no copy of the shard was available at routing time.
    pub replica: Option<ReplicaHandle>,
    pub query: Query,
}

/// Ordered dispatch entries for one request. Built once, never modified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchPlan {
    entries: Vec<PlanEntry>,
}

impl DispatchPlan {
    pub fn new(entries: Vec<PlanEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
