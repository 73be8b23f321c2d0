//! Request coordination: resolve, rewrite, route, scatter, merge.

use super::merger::ResultMerger;
use super::types::*;
use crate::alias::registry::AliasRegistry;
use crate::alias::types::ALL_INDICES;
use crate::cluster::topology::Topology;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::executor::cancel::CancelSignal;
use crate::executor::scatter::ScatterGatherExecutor;
use crate::executor::types::{ShardQueryExecutor, ShardResult};
use crate::query::mlt::MoreLikeThisQueryBuilder;
use crate::query::rewriter::QueryRewriter;
use crate::query::types::Query;
use crate::routing::router::ShardRouter;
use crate::routing::types::DispatchPlan;
use crate::storage::traits::{IndexStore, TermStatistics};

use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct SearchCoordinator {
    config: SearchConfig,
    registry: Arc<AliasRegistry>,
    router: ShardRouter,
    scatter: ScatterGatherExecutor,
    mlt: MoreLikeThisQueryBuilder,
    store: Arc<dyn IndexStore>,
}

impl SearchCoordinator {
    pub fn new(
        config: SearchConfig,
        registry: Arc<AliasRegistry>,
        topology: Arc<dyn Topology>,
        executor: Arc<dyn ShardQueryExecutor>,
        store: Arc<dyn IndexStore>,
        stats: Arc<dyn TermStatistics>,
    ) -> Self {
        let scatter = ScatterGatherExecutor::new(executor, config.max_in_flight);
        Self {
            router: ShardRouter::new(topology),
            scatter,
            mlt: MoreLikeThisQueryBuilder::new(stats),
            registry,
            store,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<AliasRegistry> {
        &self.registry
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        self.search_with_cancel(request, &CancelSignal::never()).await
    }

    /// Runs `request`, settling every outstanding shard as cancelled once `cancel` fires.
    pub async fn search_with_cancel(
        &self,
        request: &SearchRequest,
        cancel: &CancelSignal,
    ) -> Result<SearchResponse, SearchError> {
        let started = Instant::now();
        let size = request.size.unwrap_or(self.config.default_size);
        let window = request.from.saturating_add(size);

        let mut response = self
            .scatter_gather(
                &request.targets,
                &request.types,
                &request.query,
                window,
                request.fields.as_deref(),
                request.timeout,
                cancel,
            )
            .await
            .and_then(|results| ResultMerger::merge(results, request.from, size))?;

        response.took_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(
            "Search over {:?} took {}ms ({} hits)",
            request.targets,
            response.took_ms,
            response.total_hits
        );
        Ok(response)
    }

    /// Number of matching documents, without fetching any hits.
    pub async fn count(&self, request: &CountRequest) -> Result<CountResponse, SearchError> {
        let results = self
            .scatter_gather(
                &request.targets,
                &request.types,
                &request.query,
                0,
                None,
                request.timeout,
                &CancelSignal::never(),
            )
            .await?;
        ResultMerger::merge(results, 0, 0).map(CountResponse::from)
    }

    /// Runs every request concurrently; each one succeeds or fails on its own.
    pub async fn multi_search(&self, requests: &[SearchRequest]) -> MultiSearchResponse {
        let responses = join_all(requests.iter().map(|request| self.search(request))).await;
        MultiSearchResponse { responses }
    }

    pub async fn more_like_this(
        &self,
        request: &MoreLikeThisRequest,
    ) -> Result<SearchResponse, SearchError> {
        self.more_like_this_with_cancel(request, &CancelSignal::never())
            .await
    }

    /// Searches for documents similar to the request's source document.
    ///
    /// The source index may be an alias as long as it points at a single index;
    /// that index serves both the document and the term statistics.
    pub async fn more_like_this_with_cancel(
        &self,
        request: &MoreLikeThisRequest,
        cancel: &CancelSignal,
    ) -> Result<SearchResponse, SearchError> {
        let source_index = self.registry.snapshot().resolve_single(&request.index)?.index;
        let source = self
            .store
            .get_document(&source_index, &request.doc_type, &request.id)
            .await?
            .ok_or_else(|| SearchError::DocumentMissing {
                index: request.index.clone(),
                doc_type: request.doc_type.clone(),
                id: request.id.clone(),
            })?;

        let params = request.parameters(&self.config.mlt);
        let query = self
            .mlt
            .build(&source, &source_index, &params)
            .await
            .excluding(Query::all_of(vec![
                Query::ids([source.id.clone()]),
                Query::doc_type(source.doc_type.clone()),
            ]));

        let search = SearchRequest {
            targets: request.search_targets(),
            types: request.search_types.clone(),
            query,
            from: request.search_from,
            size: request.search_size,
            timeout: request.timeout,
            fields: None,
        };
        self.search_with_cancel(&search, cancel).await
    }

    /// Builds the dispatch plan. Every target is resolved against one snapshot.
    pub fn plan(
        &self,
        targets: &[String],
        types: &[String],
        query: &Query,
    ) -> Result<DispatchPlan, SearchError> {
        let snapshot = self.registry.snapshot();
        let base = QueryRewriter::restrict_types(query.clone(), types);

        let mut target_queries = Vec::new();
        if targets.is_empty() {
            let resolutions = snapshot.resolve(ALL_INDICES[0])?;
            target_queries.extend(QueryRewriter::rewrite_target(ALL_INDICES[0], &base, &resolutions));
        }
        for target in targets {
            let resolutions = snapshot.resolve(target)?;
            target_queries.extend(QueryRewriter::rewrite_target(target, &base, &resolutions));
        }

        self.router.route(&target_queries)
    }

    #[allow(clippy::too_many_arguments)]
    async fn scatter_gather(
        &self,
        targets: &[String],
        types: &[String],
        query: &Query,
        window: usize,
        fields: Option<&[String]>,
        timeout: Option<Duration>,
        cancel: &CancelSignal,
    ) -> Result<Vec<ShardResult>, SearchError> {
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        let plan = self.plan(targets, types, query)?;
        let timeout = timeout.unwrap_or_else(|| self.config.default_timeout_duration());

        let results = self
            .scatter
            .execute(&plan, window, fields, timeout, cancel)
            .await;

        if cancel.is_cancelled() {
            tracing::debug!("Search over {:?} was cancelled", targets);
            return Err(SearchError::Cancelled);
        }
        Ok(results)
    }
}
