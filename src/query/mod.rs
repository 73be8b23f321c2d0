//! Query Module
//!
//! The query tree and everything that produces one.
//!
//! ## Submodules
//! - **`types`**: The immutable `Query` tree.
//! - **`tokenizer`**: Text analysis shared by indexing-time matching and term extraction.
//! - **`rewriter`**: Scopes a caller query to an alias filter or a set of types.
//! - **`mlt`**: Derives a query from a reference document's significant terms.

pub mod mlt;
pub mod rewriter;
pub mod tokenizer;
pub mod types;
