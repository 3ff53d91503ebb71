//! # matpath-engine
//!
//! Path maintenance and tree queries for materialized-path trees.
//!
//! This crate keeps the `path` column of a flat tree table consistent with
//! its parent keys, against any store implementing [`PathStore`], and answers
//! subtree and ancestor-chain queries for many nodes with one prefix query.
//!
//! ## Key Features
//!
//! - **Subtree rewrites** - Moving a node rewrites its subtree with one prefix
//!   replacement, then heals uncomputed rows with a root-to-leaf worklist
//! - **Bulk computation** - Level-by-level fixpoint over a whole table,
//!   bounded and failing loudly on cycles and orphans
//! - **Cycle checks** - Reparenting is validated before any write
//! - **Covering-set batching** - Redundant prefix filters are dropped before
//!   the store is queried; reduced plans are kept in an LRU cache
//! - **Optional parallelism** - Enable the `parallel` feature to partition
//!   batch results on rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use matpath::{Node, NodeId, TreeConfig};
//! use matpath_engine::{EngineConfig, PathStore, PlanCacheConfig, TreeEngine};
//! use matpath_memory::MemoryStore;
//!
//! let store = MemoryStore::new();
//! store.insert(Node::root(1u64));
//! store.insert(Node::child_of(2u64, 1u64));
//! store.insert(Node::child_of(4u64, 2u64));
//! store.insert(Node::child_of(20u64, 1u64));
//!
//! let tree = TreeConfig::default();
//! let config = EngineConfig::builder()
//!     .with_plan_cache(PlanCacheConfig::default())
//!     .build();
//! let engine = TreeEngine::with_config(&store, config);
//!
//! let report = engine.compute_all_path(&tree).unwrap();
//! assert_eq!(report.iterations, 2);
//!
//! let two = store.get(&tree, &NodeId::from(2u64)).unwrap().unwrap();
//! let below = engine.descendants_of(&tree, &two).unwrap();
//! assert_eq!(below.len(), 1); // 4, not 20
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` - Partitions batch results using rayon
//! - `serde` - Enables serde on the model types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      matpath-engine                          │
//! │                                                              │
//! │  TreeEngine (transaction scope per mutation)                 │
//! │  ├── PathComputer    - node + subtree path updates          │
//! │  ├── compute_all_path - full-table fixpoint                 │
//! │  ├── CycleGuard      - checked reparenting                  │
//! │  └── TreeQueryEngine - reduced batch fetch + matching       │
//! │                                                              │
//! │  Dependencies:                                               │
//! │  ├── matpath         - NodeId, Node, TreePath, TreeConfig   │
//! │  └── PathStore       - implemented by matpath-memory, ...   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod bulk;
mod cache;
mod computer;
mod config;
mod engine;
mod error;
mod filter;
mod guard;
mod planner;
mod predicates;
mod query;
mod result;
mod traits;
mod traverser;

#[cfg(test)]
mod testing;

// Public re-exports
pub use bulk::compute_all_path;
pub use cache::{PlanCache, PlanCacheStats, PlanKey};
pub use computer::PathComputer;
pub use config::{EngineConfig, EngineConfigBuilder, PlanCacheConfig, DEFAULT_MAX_DEPTH};
pub use engine::TreeEngine;
pub use error::{TreeError, TreeResult};
pub use filter::{FieldUpdate, PrefixRewrite, RowFilter};
pub use guard::CycleGuard;
pub use planner::{reduce_for_ancestors, reduce_for_descendants, BatchDirection, BatchPlan};
pub use predicates::{
    depth, is_ancestor_of, is_child_of, is_descendant_of, is_leaf, is_parent_of, is_root,
    is_sibling_of,
};
pub use query::TreeQueryEngine;
pub use result::{BatchResult, BatchStats, BulkReport, UpdateReport};
pub use traits::{NoopTransaction, PathStore, StoreTransaction};
pub use traverser::HierarchyTraverser;

// Re-export commonly used model types for convenience
pub use matpath::{Node, NodeId, TreeConfig, TreePath};
