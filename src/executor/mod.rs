//! Shard Execution Module
//!
//! Runs a dispatch plan against the shards of the cluster.
//!
//! ## Architecture Overview
//! 1. **Plan**: The router hands over one entry per (shard, effective query).
//! 2. **Scatter**: One worker task per entry, bounded by a permit pool.
//! 3. **Execute**: Each worker calls the `ShardQueryExecutor` collaborator under its
//!    own deadline while watching for cancellation.
//! 4. **Gather**: Every entry settles into exactly one `ShardResult`; failures are
//!    values, never errors, and are left to the merger to count.
//!
//! ## Submodules
//! - **`types`**: Shard requests, hits, failures and the executor trait.
//! - **`cancel`**: Cancellation handle/signal pair.
//! - **`scatter`**: The bounded, deadline-aware fan-out.

pub mod cancel;
pub mod scatter;
pub mod types;
