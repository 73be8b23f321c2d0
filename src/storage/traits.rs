//! Collaborator interfaces over document storage.

use super::types::Document;
use crate::error::SearchError;

use async_trait::async_trait;

/// Point reads of stored documents.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// `Ok(None)` when the document does not exist; `IndexMissing` when the index does not.
    async fn get_document(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
    ) -> Result<Option<Document>, SearchError>;
}

/// Corpus statistics used to pick significant terms.
#[async_trait]
pub trait TermStatistics: Send + Sync {
    /// Number of documents in `index` whose `field` contains `term`.
    async fn document_frequency(&self, index: &str, field: &str, term: &str) -> u64;

    /// Number of documents in `index`.
    async fn document_count(&self, index: &str) -> u64;
}
