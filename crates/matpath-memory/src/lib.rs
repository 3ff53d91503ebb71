//! # matpath-memory
//!
//! In-memory [`PathStore`](matpath_engine::PathStore) for `matpath-engine`.
//!
//! [`MemoryStore`] keeps the rows of one node type in an ordered map behind
//! a `parking_lot` read/write lock and implements every store operation the
//! engine needs, including the level pass of the bulk computation and real
//! transactions (writer lock + snapshot rollback).
//!
//! ## Features
//!
//! - **`persistence`**: Save/load the table as a JSON snapshot
//!
//! ## Quick Start
//!
//! ```rust
//! use matpath::{Node, NodeId, TreeConfig};
//! use matpath_engine::TreeEngine;
//! use matpath_memory::MemoryStore;
//!
//! let store = MemoryStore::from_nodes([
//!     Node::root(1u64),
//!     Node::child_of(2u64, 1u64),
//!     Node::child_of(3u64, 2u64),
//! ])
//! .unwrap();
//!
//! let tree = TreeConfig::default();
//! let engine = TreeEngine::new(&store);
//! engine.compute_all_path(&tree).unwrap();
//!
//! let paths: Vec<String> = store
//!     .nodes()
//!     .into_iter()
//!     .filter_map(|n| n.path.map(|p| p.into_string()))
//!     .collect();
//! assert_eq!(paths, vec!["/1", "/1/2", "/1/2/3"]);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
mod store;

#[cfg(feature = "persistence")]
pub mod persistence;

pub use error::{MemoryStoreError, MemoryStoreResult};
pub use store::MemoryStore;
