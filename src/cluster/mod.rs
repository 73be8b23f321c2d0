//! Cluster Topology Module
//!
//! Describes which nodes exist, which indices exist and where every shard of an
//! index lives. This is the topology collaborator consumed by the router; it does
//! not perform discovery or failure detection itself, node state is set from the
//! outside.
//!
//! ## Core Concepts
//! - **Placement**: shard `n` of an index gets its primary on the `n`-th node (by
//!   sorted node id) and its replicas on the following nodes.
//! - **Document routing**: a document id hashes to a fixed shard of its index.
//! - **Availability**: a replica is available only while its node is `Alive`.

pub mod topology;
pub mod types;
