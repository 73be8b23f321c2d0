//! Shared helpers for the integration test suites.
//!
//! Import via `mod common;`.

#![allow(dead_code)]

use async_trait::async_trait;
use search_cluster::Client;
use search_cluster::cluster::types::ReplicaHandle;
use search_cluster::executor::types::{ShardFailure, ShardHits, ShardQueryExecutor, ShardRequest};
use search_cluster::query::types::Query;
use search_cluster::storage::types::IndexRequest;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Installs a test-friendly subscriber once; `RUST_LOG` controls the level.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Corpus
// ============================================================================

pub const RELEASE_CORPUS: [(&str, &str); 4] = [
    ("1", "lucene beta"),
    ("2", "lucene release"),
    ("3", "elasticsearch beta"),
    ("4", "elasticsearch release"),
];

pub async fn index_text(client: &Client, index: &str, id: &str, text: &str) -> anyhow::Result<()> {
    client
        .index(
            IndexRequest::new(index)
                .doc_type("type1")
                .id(id)
                .source(json!({ "text": text })),
        )
        .await?;
    Ok(())
}

/// Indexes the four release/beta documents into `test`.
pub async fn index_release_corpus(client: &Client) -> anyhow::Result<()> {
    for (id, text) in RELEASE_CORPUS {
        index_text(client, "test", id, text).await?;
    }
    Ok(())
}

pub fn release_filter() -> Option<Query> {
    Some(Query::term("text", "release"))
}

pub fn beta_filter() -> Option<Query> {
    Some(Query::term("text", "beta"))
}

// ============================================================================
// Shard executor wrappers
// ============================================================================

/// Delegates to an inner executor, except for scripted shard numbers which
/// either fail as unreachable or stall for a fixed delay first.
pub struct ScriptedShards {
    inner: Arc<dyn ShardQueryExecutor>,
    unreachable: HashSet<u32>,
    delays: HashMap<u32, Duration>,
}

impl ScriptedShards {
    pub fn new(inner: Arc<dyn ShardQueryExecutor>) -> Self {
        Self {
            inner,
            unreachable: HashSet::new(),
            delays: HashMap::new(),
        }
    }

    pub fn unreachable(mut self, shards: &[u32]) -> Self {
        self.unreachable.extend(shards.iter().copied());
        self
    }

    pub fn delay(mut self, shard: u32, delay: Duration) -> Self {
        self.delays.insert(shard, delay);
        self
    }
}

#[async_trait]
impl ShardQueryExecutor for ScriptedShards {
    async fn execute(
        &self,
        replica: &ReplicaHandle,
        request: &ShardRequest,
        deadline: Instant,
    ) -> Result<ShardHits, ShardFailure> {
        let shard = replica.shard.shard;
        if self.unreachable.contains(&shard) {
            return Err(ShardFailure::unavailable(format!(
                "{} is unreachable",
                replica.shard
            )));
        }
        if let Some(delay) = self.delays.get(&shard) {
            tokio::time::sleep(*delay).await;
        }
        self.inner.execute(replica, request, deadline).await
    }
}
