//! Alias-Aware Distributed Search Library
//!
//! Executes queries over a sharded, replicated document cluster. Requests name
//! indices or filtered aliases; the library resolves them to shards, scopes the
//! query per alias, fans it out in parallel and merges whatever settles into one
//! ranked answer. Similarity ("more like this") queries are derived from a stored
//! document's significant terms and run through the same pipeline.
//!
//! ## Architecture Modules
//! - **`alias`**: Versioned, copy-on-write registry of index and alias names.
//! - **`query`**: The query tree, the tokenizer, alias filter rewriting and
//!   more-like-this query derivation.
//! - **`cluster`**: Nodes, node state and shard placement (the topology).
//! - **`routing`**: Resolved targets to a dispatch plan, one replica per shard.
//! - **`executor`**: Bounded, deadline-aware and cancellable scatter/gather.
//! - **`search`**: Request coordination and result merging.
//! - **`storage`**: The in-memory shard store, scoring and the local shard executor.
//! - **`client`**: Capability-based client facade and in-process cluster wiring.
//! - **`config`** / **`error`**: Node settings and the error taxonomy.

pub mod alias;
pub mod client;
pub mod cluster;
pub mod config;
pub mod error;
pub mod executor;
pub mod query;
pub mod routing;
pub mod search;
pub mod storage;

pub use client::client::{Client, SearchTicket};
pub use client::local::LocalNode;
pub use config::SearchConfig;
pub use error::SearchError;

/// Result alias for request-level operations.
pub type Result<T> = std::result::Result<T, SearchError>;
