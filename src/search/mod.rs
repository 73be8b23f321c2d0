//! Search Service Module
//!
//! Executes caller requests against the shards of one or more indices.
//!
//! ## Overview
//! A request names targets (indices, aliases or `_all`). The coordinator resolves
//! them against one alias snapshot, scopes the query per target, routes it to one
//! replica per shard, scatters the plan and merges whatever settles.
//!
//! ## Responsibilities
//! - **Search / Count**: Ranked hits or just the number of matches.
//! - **Multi-search**: Independent requests run side by side.
//! - **More-like-this**: A query derived from a stored document's terms.
//! - **Merging**: Deduplication, deterministic ranking, shard accounting.
//!
//! ## Submodules
//! - **`coordinator`**: The request pipeline.
//! - **`merger`**: Folds shard results into a response.
//! - **`types`**: Request and response shapes.

pub mod coordinator;
pub mod merger;
pub mod types;

#[cfg(test)]
mod tests;
