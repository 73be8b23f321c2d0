use crate::cluster::types::{NodeId, ReplicaHandle, ShardId};
use crate::query::types::Query;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use tokio::time::Instant;

/// What a single shard is asked to do.
#[derive(Debug, Clone, PartialEq)]
pub struct ShardRequest {
    pub query: Query,
    /// Number of top hits the shard has to return (`from + size` of the request).
    pub window: usize,
    /// Flattened source fields to return per hit; `None` returns the whole source.
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardHit {
    pub index: String,
    pub doc_type: String,
    pub id: String,
    pub score: f32,
    pub fields: Map<String, Value>,
}

/// Total order on hits: descending score, then ascending id, index and type.
pub fn compare_hits(a: &ShardHit, b: &ShardHit) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.id.cmp(&b.id))
        .then_with(|| a.index.cmp(&b.index))
        .then_with(|| a.doc_type.cmp(&b.doc_type))
}

/// Successful answer of one shard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShardHits {
    /// Number of matching documents on the shard, not just the returned window.
    pub total_hits: u64,
    pub hits: Vec<ShardHit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShardFailureKind {
    /// The per-shard deadline expired.
    Timeout,
    /// No copy of the shard could be reached.
    Unavailable,
    /// The shard answered with an error.
    ExecutionError,
    /// The request was cancelled before the shard settled.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardFailure {
    pub kind: ShardFailureKind,
    pub reason: String,
}

impl ShardFailure {
    pub fn new(kind: ShardFailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    pub fn timeout(reason: impl Into<String>) -> Self {
        Self::new(ShardFailureKind::Timeout, reason)
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::new(ShardFailureKind::Unavailable, reason)
    }

    pub fn execution(reason: impl Into<String>) -> Self {
        Self::new(ShardFailureKind::ExecutionError, reason)
    }

    pub fn cancelled() -> Self {
        Self::new(ShardFailureKind::Cancelled, "request cancelled")
    }
}

impl fmt::Display for ShardFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.reason)
    }
}

/// Settled outcome of one dispatch plan entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ShardResult {
    pub shard: ShardId,
    /// The node the request went to, if a replica was selected.
    pub node: Option<NodeId>,
    pub outcome: Result<ShardHits, ShardFailure>,
}

impl ShardResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn failure_kind(&self) -> Option<ShardFailureKind> {
        self.outcome.as_ref().err().map(|failure| failure.kind)
    }
}

/// Runs a query against one copy of one shard.
#[async_trait]
pub trait ShardQueryExecutor: Send + Sync {
    async fn execute(
        &self,
        replica: &ReplicaHandle,
        request: &ShardRequest,
        deadline: Instant,
    ) -> Result<ShardHits, ShardFailure>;
}
