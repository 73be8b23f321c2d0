//! Shard Routing Module
//!
//! Turns effective per-target queries into a dispatch plan: one entry per
//! (shard, effective query), each bound to a single replica.
//!
//! ## Replica selection
//! A replica on the local node is preferred. Otherwise the router rotates over the
//! available replicas so repeated requests spread across copies. A shard without an
//! available replica still gets a plan entry; it settles as unavailable at dispatch.

pub mod router;
pub mod types;
