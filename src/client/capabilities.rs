//! Narrow capability interfaces a [`Client`](super::client::Client) is composed of.

use super::types::CreateIndexRequest;
use crate::alias::types::{AliasAction, AliasMetadata};
use crate::error::SearchError;
use crate::executor::cancel::CancelSignal;
use crate::search::coordinator::SearchCoordinator;
use crate::search::types::*;
use crate::storage::types::{
    DeleteRequest, DeleteResponse, GetRequest, GetResponse, IndexRequest, IndexResponse,
};

use async_trait::async_trait;

/// Document write path.
#[async_trait]
pub trait DocumentWriter: Send + Sync {
    async fn index(&self, request: IndexRequest) -> Result<IndexResponse, SearchError>;

    async fn get(&self, request: GetRequest) -> Result<GetResponse, SearchError>;

    async fn delete(&self, request: DeleteRequest) -> Result<DeleteResponse, SearchError>;
}

/// Read path: every query a client can run.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn search_with_cancel(
        &self,
        request: &SearchRequest,
        cancel: &CancelSignal,
    ) -> Result<SearchResponse, SearchError>;

    async fn count(&self, request: &CountRequest) -> Result<CountResponse, SearchError>;

    async fn multi_search(&self, requests: &[SearchRequest]) -> MultiSearchResponse;

    async fn more_like_this_with_cancel(
        &self,
        request: &MoreLikeThisRequest,
        cancel: &CancelSignal,
    ) -> Result<SearchResponse, SearchError>;
}

/// Index and alias administration.
#[async_trait]
pub trait AdminOps: Send + Sync {
    async fn create_index(&self, request: CreateIndexRequest) -> Result<(), SearchError>;

    async fn delete_index(&self, index: &str) -> Result<(), SearchError>;

    /// Applies every action atomically and returns the new alias version.
    async fn update_aliases(&self, actions: Vec<AliasAction>) -> Result<u64, SearchError>;

    async fn get_aliases(&self, index: &str) -> Result<Vec<AliasMetadata>, SearchError>;
}

#[async_trait]
impl QueryExecutor for SearchCoordinator {
    async fn search_with_cancel(
        &self,
        request: &SearchRequest,
        cancel: &CancelSignal,
    ) -> Result<SearchResponse, SearchError> {
        SearchCoordinator::search_with_cancel(self, request, cancel).await
    }

    async fn count(&self, request: &CountRequest) -> Result<CountResponse, SearchError> {
        SearchCoordinator::count(self, request).await
    }

    async fn multi_search(&self, requests: &[SearchRequest]) -> MultiSearchResponse {
        SearchCoordinator::multi_search(self, requests).await
    }

    async fn more_like_this_with_cancel(
        &self,
        request: &MoreLikeThisRequest,
        cancel: &CancelSignal,
    ) -> Result<SearchResponse, SearchError> {
        SearchCoordinator::more_like_this_with_cancel(self, request, cancel).await
    }
}
