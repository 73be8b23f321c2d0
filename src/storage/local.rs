use super::memory::ShardStore;
use super::scoring::{AnalyzedDocument, Scorer, TermFrequencyScorer};
use crate::cluster::types::ReplicaHandle;
use crate::executor::types::{
    ShardFailure, ShardHit, ShardHits, ShardQueryExecutor, ShardRequest, compare_hits,
};

use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::Instant;

/// Executes shard requests against the in-memory [`ShardStore`].
///
/// A replica whose node is not alive answers as unavailable, the way a remote
/// copy on a crashed node would.
pub struct LocalShardExecutor {
    store: Arc<ShardStore>,
    scorer: Arc<dyn Scorer>,
}

impl LocalShardExecutor {
    pub fn new(store: Arc<ShardStore>) -> Self {
        Self::with_scorer(store, Arc::new(TermFrequencyScorer))
    }

    pub fn with_scorer(store: Arc<ShardStore>, scorer: Arc<dyn Scorer>) -> Self {
        Self { store, scorer }
    }
}

#[async_trait]
impl ShardQueryExecutor for LocalShardExecutor {
    async fn execute(
        &self,
        replica: &ReplicaHandle,
        request: &ShardRequest,
        deadline: Instant,
    ) -> Result<ShardHits, ShardFailure> {
        if !self.store.topology().is_alive(&replica.node) {
            return Err(ShardFailure::unavailable(format!(
                "node {} hosting {} is not alive",
                replica.node, replica.shard
            )));
        }
        if !self.store.topology().has_index(&replica.shard.index) {
            return Err(ShardFailure::execution(format!(
                "index [{}] was deleted",
                replica.shard.index
            )));
        }

        let documents = self.store.documents(&replica.shard);
        let mut total_hits = 0u64;
        let mut hits = Vec::new();

        for document in &documents {
            if Instant::now() >= deadline {
                return Err(ShardFailure::timeout(format!(
                    "shard {} ran past its deadline",
                    replica.shard
                )));
            }
            let analyzed = AnalyzedDocument::new(document);
            if let Some(score) = self.scorer.score(&request.query, &analyzed) {
                total_hits += 1;
                if request.window > 0 {
                    hits.push(ShardHit {
                        index: document.index.clone(),
                        doc_type: document.doc_type.clone(),
                        id: document.id.clone(),
                        score,
                        fields: document.select_fields(request.fields.as_deref()),
                    });
                }
            }
        }

        hits.sort_by(compare_hits);
        hits.truncate(request.window);

        tracing::trace!(
            "Shard {} matched {} of {} documents",
            replica.shard,
            total_hits,
            documents.len()
        );
        Ok(ShardHits { total_hits, hits })
    }
}
