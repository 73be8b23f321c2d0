//! Search Module Tests
//!
//! Validates merging and the request pipeline over an in-memory cluster.
//!
//! ## Test Scopes
//! - **Merger**: Totals, ranking, deduplication, slicing and shard accounting.
//! - **Coordinator**: Alias scoping, count, multi-search, more-like-this, cancellation.

#[cfg(test)]
mod tests {
    use crate::alias::registry::AliasRegistry;
    use crate::cluster::topology::ClusterTopology;
    use crate::cluster::types::{IndexSettings, NodeId, ShardId};
    use crate::config::SearchConfig;
    use crate::error::SearchError;
    use crate::executor::cancel::cancel_pair;
    use crate::executor::types::{ShardFailure, ShardFailureKind, ShardHit, ShardHits, ShardResult};
    use crate::query::types::Query;
    use crate::search::coordinator::SearchCoordinator;
    use crate::search::merger::ResultMerger;
    use crate::search::types::{CountRequest, MoreLikeThisRequest, SearchRequest};
    use crate::storage::local::LocalShardExecutor;
    use crate::storage::memory::ShardStore;
    use crate::storage::types::Document;
    use serde_json::{Map, json};
    use std::sync::Arc;

    fn hit(id: &str, score: f32) -> ShardHit {
        ShardHit {
            index: "test".to_string(),
            doc_type: "type1".to_string(),
            id: id.to_string(),
            score,
            fields: Map::new(),
        }
    }

    fn success(shard: u32, total_hits: u64, hits: Vec<ShardHit>) -> ShardResult {
        ShardResult {
            shard: ShardId::new("test", shard),
            node: Some(NodeId("node-0".to_string())),
            outcome: Ok(ShardHits { total_hits, hits }),
        }
    }

    fn failure(shard: u32, failure: ShardFailure) -> ShardResult {
        ShardResult {
            shard: ShardId::new("test", shard),
            node: None,
            outcome: Err(failure),
        }
    }

    struct Fixture {
        coordinator: SearchCoordinator,
        store: Arc<ShardStore>,
        registry: Arc<AliasRegistry>,
    }

    impl Fixture {
        fn new(shards: u32) -> Self {
            let topology = Arc::new(ClusterTopology::with_nodes(1));
            topology
                .create_index("test", IndexSettings::new(shards, 0))
                .unwrap();
            let registry = Arc::new(AliasRegistry::new());
            registry.register_index("test").unwrap();

            let store = Arc::new(ShardStore::new(topology.clone()));
            let coordinator = SearchCoordinator::new(
                SearchConfig::default(),
                registry.clone(),
                topology,
                Arc::new(LocalShardExecutor::new(store.clone())),
                store.clone(),
                store.clone(),
            );
            Self {
                coordinator,
                store,
                registry,
            }
        }

        fn index(&self, doc_type: &str, id: &str, text: &str) {
            self.store
                .put(Document::new("test", doc_type, id, json!({ "text": text })))
                .unwrap();
        }

        /// The four-document corpus with `release` and `beta` aliases.
        fn with_release_corpus(shards: u32) -> Self {
            let fixture = Self::new(shards);
            fixture.index("type1", "1", "lucene beta");
            fixture.index("type1", "2", "lucene release");
            fixture.index("type1", "3", "elasticsearch beta");
            fixture.index("type1", "4", "elasticsearch release");
            fixture
                .registry
                .create_alias("test", "release", Some(Query::term("text", "release")))
                .unwrap();
            fixture
                .registry
                .create_alias("test", "beta", Some(Query::term("text", "beta")))
                .unwrap();
            fixture
        }
    }

    // ============================================================
    // MERGER
    // ============================================================

    #[test]
    fn test_merge_sums_totals_and_ranks_hits() {
        let results = vec![
            success(0, 4, vec![hit("b", 1.0), hit("c", 0.5)]),
            success(1, 3, vec![hit("a", 1.0), hit("d", 2.0)]),
        ];

        let response = ResultMerger::merge(results, 0, 10).unwrap();

        assert_eq!(response.total_hits, 7);
        assert_eq!(response.hit_ids(), vec!["d", "a", "b", "c"]);
        assert_eq!(response.successful_shards, 2);
        assert_eq!(response.failed_shards, 0);
        assert!(!response.timed_out);
    }

    #[test]
    fn test_merge_equal_scores_order_by_id() {
        // Shard completion order must not matter
        let forward = ResultMerger::merge(
            vec![
                success(0, 1, vec![hit("2", 1.0)]),
                success(1, 1, vec![hit("1", 1.0)]),
            ],
            0,
            10,
        )
        .unwrap();
        let reversed = ResultMerger::merge(
            vec![
                success(1, 1, vec![hit("1", 1.0)]),
                success(0, 1, vec![hit("2", 1.0)]),
            ],
            0,
            10,
        )
        .unwrap();

        assert_eq!(forward.hit_ids(), vec!["1", "2"]);
        assert_eq!(forward.hits, reversed.hits);
    }

    #[test]
    fn test_merge_slices_from_and_size() {
        let results = vec![success(
            0,
            5,
            vec![
                hit("a", 5.0),
                hit("b", 4.0),
                hit("c", 3.0),
                hit("d", 2.0),
                hit("e", 1.0),
            ],
        )];

        let response = ResultMerger::merge(results, 1, 2).unwrap();

        assert_eq!(response.hit_ids(), vec!["b", "c"]);
        assert_eq!(response.total_hits, 5);
    }

    #[test]
    fn test_merge_collapses_duplicate_documents() {
        // The same document reached through two effective queries
        let results = vec![
            success(0, 1, vec![hit("1", 0.5)]),
            success(0, 1, vec![hit("1", 2.0)]),
        ];

        let response = ResultMerger::merge(results, 0, 10).unwrap();

        assert_eq!(response.hits.len(), 1);
        assert_eq!(response.hits[0].score, 2.0);
        assert_eq!(response.total_hits, 2);
    }

    #[test]
    fn test_merge_partial_failure_is_degraded_success() {
        let results = vec![
            success(0, 1, vec![hit("1", 1.0)]),
            failure(1, ShardFailure::unavailable("node down")),
            failure(2, ShardFailure::timeout("too slow")),
        ];

        let response = ResultMerger::merge(results, 0, 10).unwrap();

        assert_eq!(response.total_shards, 3);
        assert_eq!(response.successful_shards, 1);
        assert_eq!(response.failed_shards, 2);
        assert!(response.timed_out);
        assert!(response.is_degraded());
        assert_eq!(response.shard_failures[0].kind, ShardFailureKind::Unavailable);
        assert_eq!(response.shard_failures[1].shard, 2);
    }

    #[test]
    fn test_merge_all_failed_is_an_error() {
        let results = vec![
            failure(0, ShardFailure::execution("boom")),
            failure(1, ShardFailure::unavailable("node down")),
        ];

        let err = ResultMerger::merge(results, 0, 10).unwrap_err();

        match err {
            SearchError::AllShardsFailed { total, reasons } => {
                assert_eq!(total, 2);
                assert_eq!(reasons.len(), 2);
            }
            other => panic!("expected AllShardsFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_nothing_is_empty_success() {
        let response = ResultMerger::merge(vec![], 0, 10).unwrap();

        assert_eq!(response.total_hits, 0);
        assert!(response.hits.is_empty());
    }

    // ============================================================
    // COORDINATOR - SEARCH
    // ============================================================

    #[tokio::test]
    async fn test_search_index_returns_every_match() {
        let fixture = Fixture::with_release_corpus(3);

        let response = fixture
            .coordinator
            .search(&SearchRequest::new(["test"]).query(Query::term("text", "release")))
            .await
            .unwrap();

        assert_eq!(response.total_hits, 2);
        assert_eq!(response.hit_ids(), vec!["2", "4"]);
        assert_eq!(response.total_shards, 3);
        assert_eq!(response.successful_shards, 3);
    }

    #[tokio::test]
    async fn test_search_alias_applies_its_filter() {
        let fixture = Fixture::with_release_corpus(3);

        let response = fixture
            .coordinator
            .search(&SearchRequest::new(["beta"]).query(Query::term("text", "lucene")))
            .await
            .unwrap();

        assert_eq!(response.hit_ids(), vec!["1"]);
    }

    #[tokio::test]
    async fn test_search_index_and_alias_in_one_request() {
        let fixture = Fixture::with_release_corpus(2);

        // The unfiltered target already covers everything the alias sees
        let response = fixture
            .coordinator
            .search(&SearchRequest::new(["test", "beta"]))
            .await
            .unwrap();

        assert_eq!(response.hit_ids(), vec!["1", "2", "3", "4"]);
        assert_eq!(response.total_shards, 4);
    }

    #[tokio::test]
    async fn test_search_without_targets_covers_all_indices() {
        let fixture = Fixture::with_release_corpus(2);

        let response = fixture
            .coordinator
            .search(&SearchRequest::new(Vec::<String>::new()))
            .await
            .unwrap();

        assert_eq!(response.total_hits, 4);
    }

    #[tokio::test]
    async fn test_search_unknown_target_fails_before_dispatch() {
        let fixture = Fixture::with_release_corpus(2);

        let err = fixture
            .coordinator
            .search(&SearchRequest::new(["test", "nope"]))
            .await
            .unwrap_err();

        assert_eq!(err, SearchError::AliasMissing("nope".to_string()));
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_search_restricts_types() {
        let fixture = Fixture::new(2);
        fixture.index("type1", "1", "rust");
        fixture.index("type2", "2", "rust");

        let response = fixture
            .coordinator
            .search(&SearchRequest::new(["test"]).types(["type2"]))
            .await
            .unwrap();

        assert_eq!(response.hit_ids(), vec!["2"]);
    }

    #[tokio::test]
    async fn test_search_returns_requested_fields_only() {
        let fixture = Fixture::new(1);
        fixture
            .store
            .put(Document::new(
                "test",
                "type1",
                "1",
                json!({ "title": "rust", "meta": { "author": "ferris" } }),
            ))
            .unwrap();

        let response = fixture
            .coordinator
            .search(&SearchRequest::new(["test"]).fields(["meta.author"]))
            .await
            .unwrap();

        let fields = &response.hits[0].fields;
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["meta.author"], json!("ferris"));
    }

    #[tokio::test]
    async fn test_search_uses_default_size() {
        let fixture = Fixture::new(2);
        for i in 0..15 {
            fixture.index("type1", &format!("{:02}", i), "rust");
        }

        let response = fixture
            .coordinator
            .search(&SearchRequest::new(["test"]))
            .await
            .unwrap();

        assert_eq!(response.total_hits, 15);
        assert_eq!(response.hits.len(), 10);
    }

    #[tokio::test]
    async fn test_search_cancelled_before_start() {
        let fixture = Fixture::with_release_corpus(2);
        let (handle, signal) = cancel_pair();
        handle.cancel();

        let err = fixture
            .coordinator
            .search_with_cancel(&SearchRequest::new(["test"]), &signal)
            .await
            .unwrap_err();

        assert_eq!(err, SearchError::Cancelled);
    }

    // ============================================================
    // COORDINATOR - COUNT AND MULTI-SEARCH
    // ============================================================

    #[tokio::test]
    async fn test_count_through_alias() {
        let fixture = Fixture::with_release_corpus(3);

        let count = fixture
            .coordinator
            .count(&CountRequest::new(["release"]))
            .await
            .unwrap();

        assert_eq!(count.count, 2);
        assert_eq!(count.successful_shards, 3);
    }

    #[tokio::test]
    async fn test_multi_search_items_fail_independently() {
        let fixture = Fixture::with_release_corpus(2);

        let multi = fixture
            .coordinator
            .multi_search(&[
                SearchRequest::new(["release"]),
                SearchRequest::new(["missing"]),
                SearchRequest::new(["beta"]),
            ])
            .await;

        assert_eq!(multi.responses.len(), 3);
        assert_eq!(multi.responses[0].as_ref().unwrap().hit_ids(), vec!["2", "4"]);
        assert_eq!(
            multi.responses[1],
            Err(SearchError::AliasMissing("missing".to_string()))
        );
        assert_eq!(multi.responses[2].as_ref().unwrap().hit_ids(), vec!["1", "3"]);
    }

    // ============================================================
    // COORDINATOR - MORE LIKE THIS
    // ============================================================

    #[tokio::test]
    async fn test_more_like_this_excludes_source() {
        let fixture = Fixture::with_release_corpus(3);

        let response = fixture
            .coordinator
            .more_like_this(
                &MoreLikeThisRequest::new("test")
                    .doc_type("type1")
                    .id("1")
                    .min_term_freq(1)
                    .min_doc_freq(1),
            )
            .await
            .unwrap();

        assert_eq!(response.hit_ids(), vec!["2", "3"]);
    }

    #[tokio::test]
    async fn test_more_like_this_source_through_alias() {
        let fixture = Fixture::with_release_corpus(3);

        let response = fixture
            .coordinator
            .more_like_this(
                &MoreLikeThisRequest::new("beta")
                    .doc_type("type1")
                    .id("1")
                    .min_term_freq(1)
                    .min_doc_freq(1),
            )
            .await
            .unwrap();

        assert_eq!(response.hit_ids(), vec!["3"]);
    }

    #[tokio::test]
    async fn test_more_like_this_missing_document() {
        let fixture = Fixture::with_release_corpus(2);

        let err = fixture
            .coordinator
            .more_like_this(&MoreLikeThisRequest::new("test").doc_type("type1").id("99"))
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::DocumentMissing { ref id, .. } if id == "99"));
    }

    #[tokio::test]
    async fn test_more_like_this_thin_document_matches_nothing() {
        let fixture = Fixture::with_release_corpus(2);

        // Default min_term_freq of 2 rejects every single-occurrence term
        let response = fixture
            .coordinator
            .more_like_this(&MoreLikeThisRequest::new("test").doc_type("type1").id("1"))
            .await
            .unwrap();

        assert_eq!(response.total_hits, 0);
        assert!(response.hits.is_empty());
        assert_eq!(response.successful_shards, 2);
    }
}
