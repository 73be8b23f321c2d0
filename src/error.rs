//! Error types for the search cluster
//!
//! Request-level failures are reported through [`SearchError`]. Failures of a
//! single shard are not errors: they travel as values inside a
//! [`ShardResult`](crate::executor::types::ShardResult) and only surface here as
//! [`SearchError::AllShardsFailed`] when no shard answered.

use thiserror::Error;

/// Main error type for all request-level operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// A named index does not exist, or a target expanded to no index at all.
    #[error("no such index [{0}]")]
    IndexMissing(String),

    /// A name is neither a known index nor a known alias.
    #[error("alias [{0}] missing")]
    AliasMissing(String),

    /// An alias or index name collides with an existing name of the other kind.
    #[error("name [{name}] conflicts with an existing {existing}")]
    NameConflict { name: String, existing: String },

    #[error("index [{0}] already exists")]
    IndexAlreadyExists(String),

    /// The source document of a more-like-this request does not exist.
    #[error("document [{index}/{doc_type}/{id}] missing")]
    DocumentMissing {
        index: String,
        doc_type: String,
        id: String,
    },

    /// Every dispatched shard request failed.
    #[error("all {total} shards failed: {}", reasons.join("; "))]
    AllShardsFailed { total: usize, reasons: Vec<String> },

    /// The caller cancelled the request before it settled.
    #[error("request cancelled")]
    Cancelled,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration validation failed
    #[error("configuration error: {field} - {reason}")]
    Config { field: String, reason: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl SearchError {
    /// Errors detected while resolving targets, before anything is sent to shards.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SearchError::IndexMissing(_)
                | SearchError::AliasMissing(_)
                | SearchError::NameConflict { .. }
        )
    }

    pub fn config_error(field: &str, reason: impl Into<String>) -> Self {
        SearchError::Config {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
