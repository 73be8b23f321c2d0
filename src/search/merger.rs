//! Folds settled shard results into one ranked response.

use super::types::{SearchHit, SearchResponse, ShardFailureInfo};
use crate::error::SearchError;
use crate::executor::types::{ShardFailureKind, ShardHit, ShardResult, compare_hits};

use std::collections::HashMap;
use std::collections::hash_map::Entry;

pub struct ResultMerger;

impl ResultMerger {
    /// Merges `results` and slices the ranked hits to `[from, from + size)`.
    ///
    /// Fails with `AllShardsFailed` only when there was at least one result and
    /// none of them succeeded.
    pub fn merge(
        results: Vec<ShardResult>,
        from: usize,
        size: usize,
    ) -> Result<SearchResponse, SearchError> {
        let total_shards = results.len();
        let mut total_hits = 0u64;
        let mut successful_shards = 0;
        let mut timed_out = false;
        let mut shard_failures = Vec::new();
        let mut best: HashMap<(String, String, String), ShardHit> = HashMap::new();

        for result in results {
            match result.outcome {
                Ok(shard_hits) => {
                    successful_shards += 1;
                    total_hits += shard_hits.total_hits;
                    for hit in shard_hits.hits {
                        let key = (hit.index.clone(), hit.doc_type.clone(), hit.id.clone());
                        match best.entry(key) {
                            Entry::Occupied(mut existing) => {
                                if hit.score > existing.get().score {
                                    existing.insert(hit);
                                }
                            }
                            Entry::Vacant(slot) => {
                                slot.insert(hit);
                            }
                        }
                    }
                }
                Err(failure) => {
                    timed_out |= failure.kind == ShardFailureKind::Timeout;
                    shard_failures.push(ShardFailureInfo::new(
                        &result.shard,
                        result.node.map(|node| node.to_string()),
                        &failure,
                    ));
                }
            }
        }

        let failed_shards = shard_failures.len();
        if total_shards > 0 && successful_shards == 0 {
            tracing::error!("All {} shards failed", total_shards);
            return Err(SearchError::AllShardsFailed {
                total: total_shards,
                reasons: shard_failures
                    .iter()
                    .map(|f| format!("[{}][{}] {:?}: {}", f.index, f.shard, f.kind, f.reason))
                    .collect(),
            });
        }

        let mut hits: Vec<ShardHit> = best.into_values().collect();
        hits.sort_by(compare_hits);
        let hits: Vec<SearchHit> = hits
            .into_iter()
            .skip(from)
            .take(size)
            .map(SearchHit::from)
            .collect();

        tracing::debug!(
            "Merged {} shards ({} failed): {} total hits, returning {}",
            total_shards,
            failed_shards,
            total_hits,
            hits.len()
        );

        Ok(SearchResponse {
            took_ms: 0,
            total_hits,
            hits,
            total_shards,
            successful_shards,
            failed_shards,
            timed_out,
            shard_failures,
        })
    }
}
