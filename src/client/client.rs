use super::capabilities::{AdminOps, DocumentWriter, QueryExecutor};
use super::types::CreateIndexRequest;
use crate::alias::types::{AliasAction, AliasMetadata};
use crate::error::SearchError;
use crate::executor::cancel::{CancelHandle, CancelSignal, cancel_pair};
use crate::search::types::*;
use crate::storage::types::{
    DeleteRequest, DeleteResponse, GetRequest, GetResponse, IndexRequest, IndexResponse,
};

use std::sync::Arc;
use tokio::task::JoinHandle;

/// Entry point for callers: one value holding the write, read and admin capabilities.
///
/// Cloning is cheap and every clone talks to the same cluster.
#[derive(Clone)]
pub struct Client {
    documents: Arc<dyn DocumentWriter>,
    queries: Arc<dyn QueryExecutor>,
    admin: Arc<dyn AdminOps>,
}

impl Client {
    pub fn new(
        documents: Arc<dyn DocumentWriter>,
        queries: Arc<dyn QueryExecutor>,
        admin: Arc<dyn AdminOps>,
    ) -> Self {
        Self {
            documents,
            queries,
            admin,
        }
    }

    pub fn documents(&self) -> &Arc<dyn DocumentWriter> {
        &self.documents
    }

    pub fn queries(&self) -> &Arc<dyn QueryExecutor> {
        &self.queries
    }

    pub fn admin(&self) -> &Arc<dyn AdminOps> {
        &self.admin
    }

    // Documents

    pub async fn index(&self, request: IndexRequest) -> Result<IndexResponse, SearchError> {
        self.documents.index(request).await
    }

    pub async fn get(&self, request: GetRequest) -> Result<GetResponse, SearchError> {
        self.documents.get(request).await
    }

    pub async fn delete(&self, request: DeleteRequest) -> Result<DeleteResponse, SearchError> {
        self.documents.delete(request).await
    }

    // Queries

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        self.queries
            .search_with_cancel(request, &CancelSignal::never())
            .await
    }

    pub async fn count(&self, request: &CountRequest) -> Result<CountResponse, SearchError> {
        self.queries.count(request).await
    }

    pub async fn multi_search(&self, requests: &[SearchRequest]) -> MultiSearchResponse {
        self.queries.multi_search(requests).await
    }

    pub async fn more_like_this(
        &self,
        request: &MoreLikeThisRequest,
    ) -> Result<SearchResponse, SearchError> {
        self.queries
            .more_like_this_with_cancel(request, &CancelSignal::never())
            .await
    }

    /// Starts `request` on its own task. Must be called inside a Tokio runtime.
    pub fn spawn_search(&self, request: SearchRequest) -> SearchTicket {
        let (cancel, signal) = cancel_pair();
        let queries = self.queries.clone();
        let handle =
            tokio::spawn(async move { queries.search_with_cancel(&request, &signal).await });
        SearchTicket { cancel, handle }
    }

    /// Starts a more-like-this request on its own task. Must be called inside a Tokio runtime.
    pub fn spawn_more_like_this(&self, request: MoreLikeThisRequest) -> SearchTicket {
        let (cancel, signal) = cancel_pair();
        let queries = self.queries.clone();
        let handle = tokio::spawn(async move {
            queries
                .more_like_this_with_cancel(&request, &signal)
                .await
        });
        SearchTicket { cancel, handle }
    }

    /// Runs `request` in the background and hands its outcome to `listener`.
    ///
    /// The listener is invoked exactly once: with the response, with the error,
    /// with `Cancelled` after the returned handle fires, or with `Internal` if
    /// the search task panicked.
    pub fn search_with_listener<F>(&self, request: SearchRequest, listener: F) -> CancelHandle
    where
        F: FnOnce(Result<SearchResponse, SearchError>) + Send + 'static,
    {
        let ticket = self.spawn_search(request);
        let cancel = ticket.cancel_handle();
        tokio::spawn(async move {
            listener(ticket.response().await);
        });
        cancel
    }

    // Administration

    pub async fn create_index(&self, request: CreateIndexRequest) -> Result<(), SearchError> {
        self.admin.create_index(request).await
    }

    pub async fn delete_index(&self, index: &str) -> Result<(), SearchError> {
        self.admin.delete_index(index).await
    }

    pub async fn update_aliases(&self, actions: Vec<AliasAction>) -> Result<u64, SearchError> {
        self.admin.update_aliases(actions).await
    }

    pub async fn get_aliases(&self, index: &str) -> Result<Vec<AliasMetadata>, SearchError> {
        self.admin.get_aliases(index).await
    }
}

/// A search running on its own task.
///
/// Dropping the ticket detaches the search; it still runs to completion.
pub struct SearchTicket {
    cancel: CancelHandle,
    handle: JoinHandle<Result<SearchResponse, SearchError>>,
}

impl SearchTicket {
    /// Requests cancellation. The response then resolves to `Cancelled`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Waits for the search to settle.
    pub async fn response(self) -> Result<SearchResponse, SearchError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(SearchError::Cancelled),
            Err(e) => {
                tracing::error!("Search task failed: {}", e);
                Err(SearchError::Internal(format!("search task failed: {}", e)))
            }
        }
    }
}
