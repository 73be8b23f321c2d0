//! Client Module Tests
//!
//! ## Test Scopes
//! - **Documents**: Index, get and delete through the client.
//! - **Administration**: Index lifecycle and alias updates.
//! - **Delivery**: Tickets, cancellation and exactly-once listeners.

#[cfg(test)]
mod tests {
    use crate::alias::types::AliasAction;
    use crate::client::client::Client;
    use crate::client::local::LocalNode;
    use crate::client::types::CreateIndexRequest;
    use crate::cluster::topology::Topology;
    use crate::cluster::types::{NodeId, NodeState, ReplicaHandle};
    use crate::config::SearchConfig;
    use crate::error::SearchError;
    use crate::executor::types::{ShardFailure, ShardHits, ShardQueryExecutor, ShardRequest};
    use crate::query::types::Query;
    use crate::search::coordinator::SearchCoordinator;
    use crate::search::types::{MoreLikeThisRequest, SearchRequest};
    use crate::storage::local::LocalShardExecutor;
    use crate::storage::traits::{IndexStore, TermStatistics};
    use crate::storage::types::{Document, GetRequest, IndexRequest};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio::time::Instant;

    fn node() -> LocalNode {
        LocalNode::new(SearchConfig::default().default_number_of_shards(2)).unwrap()
    }

    async fn seeded_client(node: &LocalNode) -> Client {
        let client = node.client();
        for (id, text) in [("1", "lucene beta"), ("2", "lucene release")] {
            client
                .index(
                    IndexRequest::new("test")
                        .doc_type("type1")
                        .id(id)
                        .source(json!({ "text": text })),
                )
                .await
                .unwrap();
        }
        client
    }

    /// Never answers before its deadline.
    struct HangingExecutor;

    #[async_trait]
    impl ShardQueryExecutor for HangingExecutor {
        async fn execute(
            &self,
            _replica: &ReplicaHandle,
            _request: &ShardRequest,
            _deadline: Instant,
        ) -> Result<ShardHits, ShardFailure> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ShardHits::default())
        }
    }

    struct PanickingExecutor;

    #[async_trait]
    impl ShardQueryExecutor for PanickingExecutor {
        async fn execute(
            &self,
            _replica: &ReplicaHandle,
            _request: &ShardRequest,
            _deadline: Instant,
        ) -> Result<ShardHits, ShardFailure> {
            panic!("shard executor exploded");
        }
    }

    struct PanickingStore;

    #[async_trait]
    impl IndexStore for PanickingStore {
        async fn get_document(
            &self,
            _index: &str,
            _doc_type: &str,
            _id: &str,
        ) -> Result<Option<Document>, SearchError> {
            panic!("document store exploded");
        }
    }

    /// A client whose coordinator reads source documents from `PanickingStore`.
    fn client_with_panicking_store(node: &LocalNode) -> Client {
        let topology: Arc<dyn Topology> = node.topology().clone();
        let stats: Arc<dyn TermStatistics> = node.store().clone();
        let coordinator = SearchCoordinator::new(
            SearchConfig::default(),
            node.registry().clone(),
            topology,
            Arc::new(LocalShardExecutor::new(node.store().clone())),
            Arc::new(PanickingStore),
            stats,
        );
        let client = node.client();
        Client::new(
            client.documents().clone(),
            Arc::new(coordinator),
            client.admin().clone(),
        )
    }

    // ============================================================
    // DOCUMENTS
    // ============================================================

    #[tokio::test]
    async fn test_index_auto_creates_and_versions() {
        let node = node();
        let client = node.client();

        let first = client
            .index(IndexRequest::new("books").id("1").source(json!({ "title": "rust" })))
            .await
            .unwrap();
        let second = client
            .index(IndexRequest::new("books").id("1").source(json!({ "title": "tokio" })))
            .await
            .unwrap();

        assert!(first.created);
        assert_eq!(second.version, 2);
        assert!(!second.created);
        assert_eq!(node.topology().index_settings("books").unwrap().number_of_shards, 2);
    }

    #[tokio::test]
    async fn test_index_generates_missing_id() {
        let client = node().client();

        let response = client
            .index(IndexRequest::new("books").source(json!({ "title": "rust" })))
            .await
            .unwrap();

        assert!(!response.id.is_empty());
        let got = client
            .get(GetRequest::new("books", "_doc", &response.id))
            .await
            .unwrap();
        assert!(got.found);
    }

    #[tokio::test]
    async fn test_index_without_auto_create_fails() {
        let node = LocalNode::new(SearchConfig::default().auto_create_index(false)).unwrap();

        let err = node
            .client()
            .index(IndexRequest::new("books").id("1"))
            .await
            .unwrap_err();

        assert_eq!(err, SearchError::IndexMissing("books".to_string()));
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let node = node();
        let client = seeded_client(&node).await;

        let got = client.get(GetRequest::new("test", "type1", "1")).await.unwrap();
        assert!(got.found);
        assert_eq!(got.version, Some(1));
        assert_eq!(got.source, Some(json!({ "text": "lucene beta" })));

        let deleted = client.delete(GetRequest::new("test", "type1", "1")).await.unwrap();
        assert!(deleted.found);

        let gone = client.get(GetRequest::new("test", "type1", "1")).await.unwrap();
        assert!(!gone.found);
        assert_eq!(gone.source, None);
    }

    #[tokio::test]
    async fn test_writes_are_visible_to_search() {
        let node = node();
        let client = seeded_client(&node).await;

        let response = client
            .search(&SearchRequest::new(["test"]).query(Query::term("text", "lucene")))
            .await
            .unwrap();

        assert_eq!(response.total_hits, 2);
    }

    // ============================================================
    // ADMINISTRATION
    // ============================================================

    #[tokio::test]
    async fn test_create_index_with_aliases() {
        let node = node();
        let client = node.client();

        client
            .create_index(
                CreateIndexRequest::new("test")
                    .settings(3, 0)
                    .alias("release", Some(Query::term("text", "release"))),
            )
            .await
            .unwrap();

        let aliases = client.get_aliases("test").await.unwrap();
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases[0].alias, "release");
        assert_eq!(node.topology().index_settings("test").unwrap().number_of_shards, 3);
    }

    #[tokio::test]
    async fn test_create_existing_index_fails() {
        let client = node().client();
        client.create_index(CreateIndexRequest::new("test")).await.unwrap();

        let err = client
            .create_index(CreateIndexRequest::new("test"))
            .await
            .unwrap_err();

        assert_eq!(err, SearchError::IndexAlreadyExists("test".to_string()));
    }

    #[tokio::test]
    async fn test_create_index_named_like_alias_fails() {
        let node = node();
        let client = seeded_client(&node).await;
        client
            .update_aliases(vec![AliasAction::add("test", "release", None)])
            .await
            .unwrap();

        let err = client
            .create_index(CreateIndexRequest::new("release"))
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::NameConflict { .. }));
        assert!(!node.topology().has_index("release"));
    }

    #[tokio::test]
    async fn test_zero_shard_index_is_rolled_back() {
        let node = node();
        let client = node.client();

        let err = client
            .create_index(CreateIndexRequest::new("empty").settings(0, 0))
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::InvalidRequest(_)));
        assert!(!node.registry().snapshot().indices.contains("empty"));
    }

    #[tokio::test]
    async fn test_create_index_with_conflicting_alias_is_rolled_back() {
        let node = node();
        let client = node.client();
        client.create_index(CreateIndexRequest::new("other")).await.unwrap();

        let err = client
            .create_index(CreateIndexRequest::new("fresh").alias("other", None))
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::NameConflict { .. }));
        assert!(!node.topology().has_index("fresh"));
        assert!(!node.registry().snapshot().indices.contains("fresh"));
        assert_eq!(
            client.search(&SearchRequest::new(["fresh"])).await.unwrap_err(),
            SearchError::AliasMissing("fresh".to_string())
        );

        // The name is free again
        client.create_index(CreateIndexRequest::new("fresh")).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_index_drops_documents_and_aliases() {
        let node = node();
        let client = seeded_client(&node).await;
        client
            .update_aliases(vec![AliasAction::add("test", "release", None)])
            .await
            .unwrap();

        client.delete_index("test").await.unwrap();

        assert_eq!(node.store().local_document_count(), 0);
        assert_eq!(
            client.search(&SearchRequest::new(["release"])).await.unwrap_err(),
            SearchError::AliasMissing("release".to_string())
        );
        assert_eq!(
            client.get_aliases("test").await.unwrap_err(),
            SearchError::IndexMissing("test".to_string())
        );
    }

    #[tokio::test]
    async fn test_set_node_state() {
        let node = LocalNode::new(SearchConfig::default().node_count(2)).unwrap();

        node.set_node_state(&NodeId("node-1".to_string()), NodeState::Dead)
            .unwrap();

        assert!(!node.topology().is_alive(&NodeId("node-1".to_string())));
        assert!(node
            .set_node_state(&NodeId("node-9".to_string()), NodeState::Dead)
            .is_err());
    }

    // ============================================================
    // DELIVERY
    // ============================================================

    #[tokio::test]
    async fn test_spawned_search_resolves() {
        let node = node();
        let client = seeded_client(&node).await;

        let ticket = client.spawn_search(SearchRequest::new(["test"]));

        assert_eq!(ticket.response().await.unwrap().total_hits, 2);
    }

    #[tokio::test]
    async fn test_spawned_more_like_this_resolves() {
        let node = node();
        let client = seeded_client(&node).await;

        let ticket = client.spawn_more_like_this(
            MoreLikeThisRequest::new("test")
                .doc_type("type1")
                .id("1")
                .min_term_freq(1)
                .min_doc_freq(1),
        );

        let response = ticket.response().await.unwrap();
        assert_eq!(response.hit_ids(), vec!["2"]);
    }

    #[tokio::test]
    async fn test_panicking_search_task_resolves_internal() {
        let node = node();
        let client = client_with_panicking_store(&node);
        seeded_client(&node).await;

        let ticket = client.spawn_more_like_this(
            MoreLikeThisRequest::new("test").doc_type("type1").id("1"),
        );

        let outcome = ticket.response().await;
        assert!(matches!(outcome, Err(SearchError::Internal(_))));
    }

    #[tokio::test]
    async fn test_cancelled_ticket_resolves_cancelled() {
        let node = LocalNode::with_executor(SearchConfig::default(), |_| {
            Arc::new(HangingExecutor) as Arc<dyn ShardQueryExecutor>
        })
        .unwrap();
        let client = seeded_client(&node).await;

        let ticket = client.spawn_search(SearchRequest::new(["test"]));
        tokio::time::sleep(Duration::from_millis(50)).await;
        ticket.cancel();

        let outcome = tokio::time::timeout(Duration::from_secs(5), ticket.response())
            .await
            .unwrap();
        assert_eq!(outcome, Err(SearchError::Cancelled));
    }

    #[tokio::test]
    async fn test_listener_called_once_with_response() {
        let node = node();
        let client = seeded_client(&node).await;
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = oneshot::channel();

        let counter = calls.clone();
        client.search_with_listener(SearchRequest::new(["test"]), move |result| {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(result);
        });

        let result = rx.await.unwrap();
        assert_eq!(result.unwrap().total_hits, 2);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_listener_receives_configuration_error() {
        let client = node().client();
        let (tx, rx) = oneshot::channel();

        client.search_with_listener(SearchRequest::new(["nope"]), move |result| {
            let _ = tx.send(result);
        });

        assert_eq!(
            rx.await.unwrap(),
            Err(SearchError::AliasMissing("nope".to_string()))
        );
    }

    #[tokio::test]
    async fn test_listener_receives_cancellation() {
        let node = LocalNode::with_executor(SearchConfig::default(), |_| {
            Arc::new(HangingExecutor) as Arc<dyn ShardQueryExecutor>
        })
        .unwrap();
        let client = seeded_client(&node).await;
        let (tx, rx) = oneshot::channel();

        let cancel = client.search_with_listener(SearchRequest::new(["test"]), move |result| {
            let _ = tx.send(result);
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result, Err(SearchError::Cancelled));
    }

    #[tokio::test]
    async fn test_listener_receives_all_shards_failed_on_panic() {
        let config = SearchConfig::default().default_number_of_shards(2);
        let node = LocalNode::with_executor(config, |_| {
            Arc::new(PanickingExecutor) as Arc<dyn ShardQueryExecutor>
        })
        .unwrap();
        let client = seeded_client(&node).await;
        let (tx, rx) = oneshot::channel();

        client.search_with_listener(SearchRequest::new(["test"]), move |result| {
            let _ = tx.send(result);
        });

        let result = rx.await.unwrap();
        assert!(matches!(result, Err(SearchError::AllShardsFailed { total: 2, .. })));
    }
}
