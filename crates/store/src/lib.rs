// Path: crates/store/src/lib.rs
//! Typed, multi-indexed in-memory object store.
//!
//! Every table keeps its rows in a `BTreeMap` keyed by a dense typed id and
//! maintains ordered secondary indices through the [`table::TableIndex`]
//! hook. All iteration the consensus engine performs runs over these ordered
//! structures; there is no hash-ordered traversal anywhere.

/// The store aggregate and its secondary indices.
pub mod store;
/// The generic table primitive.
pub mod table;

pub use store::Store;
pub use table::{Row, Table, TableIndex};
