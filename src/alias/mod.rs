//! Alias Registry Module
//!
//! Maps alias names to one index plus an optional filter.
//!
//! Every mutation builds a new immutable [`types::AliasSnapshot`] with a higher
//! version and swaps it in; readers clone the current `Arc` and resolve against it,
//! so they never see a half-applied batch of actions.

pub mod registry;
pub mod types;
