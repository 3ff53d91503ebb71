//! Traits for stores that hold tree rows.
//!
//! This module defines the [`PathStore`] trait that must be implemented by
//! any backend that wants to keep materialized paths.
//!
//! # Architecture Note
//!
//! This crate does NOT depend on a concrete store. The trait is defined here;
//! implementations live in their own crates (see `matpath-memory` for an
//! in-memory one). Every method receives the node type's [`TreeConfig`] so a
//! SQL store can pick table and column names from it.
//!
//! # Example: Implementing PathStore
//!
//! ```ignore
//! use matpath::{Node, NodeId, TreeConfig};
//! use matpath_engine::{FieldUpdate, PathStore, PrefixRewrite, RowFilter, TreeResult};
//!
//! impl PathStore for SqlTreeStore {
//!     fn get(&self, tree: &TreeConfig, id: &NodeId) -> TreeResult<Option<Node>> {
//!         self.query_one(&format!("SELECT * FROM {} WHERE id = ?", tree.node_type), id)
//!     }
//!
//!     fn rewrite_prefix(&self, tree: &TreeConfig, rewrite: &PrefixRewrite) -> TreeResult<usize> {
//!         // UPDATE t SET path = :new || substr(path, length(:old) + 1)
//!         //  WHERE path = :old OR path LIKE :old || '/%'
//!         self.execute_rewrite(tree, rewrite)
//!     }
//!
//!     // ...
//! }
//! ```

use matpath::{Node, NodeId, TreeConfig};

use crate::error::{TreeError, TreeResult};
use crate::filter::{FieldUpdate, PrefixRewrite, RowFilter};

/// A unit of work opened by [`PathStore::transaction`].
///
/// Dropping a transaction without calling [`commit`](Self::commit) rolls it back.
pub trait StoreTransaction {
    /// Makes every write since the transaction started durable.
    fn commit(self: Box<Self>) -> TreeResult<()>;
}

/// Transaction for stores that do not scope writes.
#[derive(Debug, Default)]
pub struct NoopTransaction;

impl StoreTransaction for NoopTransaction {
    fn commit(self: Box<Self>) -> TreeResult<()> {
        Ok(())
    }
}

/// Trait for stores holding the rows of one or more node types.
///
/// # Required Methods
///
/// - [`get`](Self::get) / [`get_many`](Self::get_many) - Point reads
/// - [`fetch_where`](Self::fetch_where) - Filtered reads
/// - [`update_where`](Self::update_where) - Filtered writes with constant values
/// - [`rewrite_prefix`](Self::rewrite_prefix) - Subtree path rewrite
/// - [`assign_root_paths`](Self::assign_root_paths) - `path = sep || id` for roots
/// - [`resolve_next_level`](Self::resolve_next_level) - Parent/child self-join update
///
/// # Optional Methods (with defaults)
///
/// Existence checks and child lookups fall back to `fetch_where`. Explicit
/// path joins report [`TreeError::NotYetImplemented`] and transactions are
/// no-ops unless the store overrides them.
pub trait PathStore: Send + Sync {
    /// Gets a row by key.
    fn get(&self, tree: &TreeConfig, id: &NodeId) -> TreeResult<Option<Node>>;

    /// Gets the rows for the given keys. Missing keys are skipped.
    fn get_many(&self, tree: &TreeConfig, ids: &[NodeId]) -> TreeResult<Vec<Node>>;

    /// Gets every row matching the filter.
    fn fetch_where(&self, tree: &TreeConfig, filter: &RowFilter) -> TreeResult<Vec<Node>>;

    /// Applies `fields` to every row matching `filter`; returns the affected row count.
    fn update_where(
        &self,
        tree: &TreeConfig,
        filter: &RowFilter,
        fields: &[FieldUpdate],
    ) -> TreeResult<usize>;

    /// Rewrites the path prefix of a node and every row below it.
    ///
    /// Returns the number of rows whose path was rewritten.
    fn rewrite_prefix(&self, tree: &TreeConfig, rewrite: &PrefixRewrite) -> TreeResult<usize>;

    /// Sets `path = separator || id` (and the explicit path when configured)
    /// for every root row.
    fn assign_root_paths(&self, tree: &TreeConfig) -> TreeResult<usize>;

    /// Sets `child.path = parent.path || separator || child.id` for every
    /// child without a path whose parent has one, in a single pass.
    fn resolve_next_level(&self, tree: &TreeConfig) -> TreeResult<usize>;

    /// Same as [`resolve_next_level`](Self::resolve_next_level) for the explicit path column.
    fn resolve_next_explicit_level(&self, tree: &TreeConfig) -> TreeResult<usize> {
        Err(TreeError::NotYetImplemented(format!(
            "explicit path propagation for '{}'",
            tree.node_type
        )))
    }

    /// Checks whether any row matches the filter.
    fn exists_where(&self, tree: &TreeConfig, filter: &RowFilter) -> TreeResult<bool> {
        Ok(!self.fetch_where(tree, filter)?.is_empty())
    }

    /// Gets the direct children of a node.
    fn children_of(&self, tree: &TreeConfig, id: &NodeId) -> TreeResult<Vec<Node>> {
        self.fetch_where(tree, &RowFilter::ParentEq(Some(id.clone())))
    }

    /// Opens a transaction covering every following call until commit or drop.
    fn transaction(&self) -> TreeResult<Box<dyn StoreTransaction + '_>> {
        Ok(Box::new(NoopTransaction))
    }
}

/// Runs `work` inside a store transaction when `enabled`.
///
/// Commits on success; on error the transaction is dropped and rolls back.
pub(crate) fn in_transaction<T>(
    store: &dyn PathStore,
    enabled: bool,
    work: impl FnOnce() -> TreeResult<T>,
) -> TreeResult<T> {
    if !enabled {
        return work();
    }
    let tx = store.transaction()?;
    let value = work()?;
    tx.commit()?;
    Ok(value)
}
