//! Client Module
//!
//! The caller-facing surface of the cluster.
//!
//! ## Overview
//! A [`client::Client`] is composed of three narrow capabilities rather than one
//! wide interface: a `DocumentWriter` for the write path, a `QueryExecutor` for
//! every kind of search and an `AdminOps` for index and alias administration.
//! [`local::LocalNode`] wires all three over an in-process cluster.
//!
//! ## Asynchronous delivery
//! Searches can run on their own task through a `SearchTicket` (await it or cancel
//! it) or report to a listener that is invoked exactly once.
//!
//! ## Submodules
//! - **`capabilities`**: The three capability traits.
//! - **`client`**: The `Client` value and `SearchTicket`.
//! - **`local`**: In-process cluster wiring.
//! - **`types`**: Admin request shapes.

pub mod capabilities;
pub mod client;
pub mod local;
pub mod types;

#[cfg(test)]
mod tests;
