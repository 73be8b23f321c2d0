//! Shard Storage Module
//!
//! In-memory document storage partitioned by shard, and the collaborators the
//! query layer reads through.
//!
//! ## Core Concepts
//! - **Partitioning**: Documents live on the shard their id hashes to.
//! - **Access**: `ShardStore` serves point reads (`IndexStore`) and corpus statistics
//!   (`TermStatistics`).
//! - **Execution**: `LocalShardExecutor` answers shard requests by scanning a shard and
//!   scoring every document with a pluggable `Scorer`.

pub mod local;
pub mod memory;
pub mod scoring;
pub mod traits;
pub mod types;
