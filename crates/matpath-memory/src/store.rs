//! In-memory table of tree rows.

use std::collections::BTreeMap;

use matpath::{Node, NodeId, TreeConfig, TreePath};
use matpath_engine::{
    FieldUpdate, PathStore, PrefixRewrite, RowFilter, StoreTransaction, TreeResult,
};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock, RwLockWriteGuard};
use tracing::{debug, trace};

use crate::error::{MemoryStoreError, MemoryStoreResult};

/// Thread-safe in-memory [`PathStore`] holding the rows of one node type.
///
/// Rows are kept ordered by key. Reads take a shared lock; every write takes
/// the exclusive lock for the duration of one call, so a level pass or a
/// prefix rewrite is atomic with respect to other callers.
///
/// Writes and transactions are serialized by a reentrant writer lock: an open
/// transaction owns it, so writes from its own thread proceed while writes
/// from other threads wait until it commits or rolls back. A rollback
/// restores the table as it was when the transaction started.
///
/// # Example
///
/// ```rust
/// use matpath::{Node, NodeId, TreeConfig};
/// use matpath_engine::PathStore;
/// use matpath_memory::MemoryStore;
///
/// let store = MemoryStore::new();
/// store.insert(Node::root(1u64));
/// store.insert(Node::child_of(2u64, 1u64));
///
/// let tree = TreeConfig::default();
/// assert_eq!(store.assign_root_paths(&tree).unwrap(), 1);
/// assert_eq!(store.resolve_next_level(&tree).unwrap(), 1);
///
/// let two = store.get(&tree, &NodeId::from(2u64)).unwrap().unwrap();
/// assert_eq!(two.path.unwrap().as_str(), "/1/2");
/// ```
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<BTreeMap<NodeId, Node>>,
    writer: ReentrantMutex<()>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from rows; keys must be unique.
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> MemoryStoreResult<Self> {
        let mut rows = BTreeMap::new();
        for node in nodes {
            if rows.contains_key(&node.id) {
                return Err(MemoryStoreError::DuplicateNode(node.id));
            }
            rows.insert(node.id.clone(), node);
        }
        Ok(Self {
            rows: RwLock::new(rows),
            writer: ReentrantMutex::new(()),
        })
    }

    /// Inserts or replaces a row; returns the previous row with that key.
    pub fn insert(&self, node: Node) -> Option<Node> {
        let (_writer, mut rows) = self.lock_rows();
        rows.insert(node.id.clone(), node)
    }

    /// Removes a row.
    pub fn remove(&self, id: &NodeId) -> Option<Node> {
        let (_writer, mut rows) = self.lock_rows();
        rows.remove(id)
    }

    /// Returns true if a row with this key exists.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.rows.read().contains_key(id)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns true if the store holds no row.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Copies every row, ordered by key.
    pub fn nodes(&self) -> Vec<Node> {
        self.rows.read().values().cloned().collect()
    }

    /// Takes the writer lock, then the exclusive row lock.
    fn lock_rows(
        &self,
    ) -> (
        ReentrantMutexGuard<'_, ()>,
        RwLockWriteGuard<'_, BTreeMap<NodeId, Node>>,
    ) {
        let writer = self.writer.lock();
        (writer, self.rows.write())
    }

    /// Sets one level of `column` from the parents resolved before this pass.
    fn resolve_level(&self, tree: &TreeConfig, column: Column) -> TreeResult<usize> {
        let (_writer, mut rows) = self.lock_rows();
        let mut resolved = Vec::new();
        for node in rows.values().filter(|n| column.get(n).is_none()) {
            let parent_value = node
                .parent_id
                .as_ref()
                .and_then(|p| rows.get(p))
                .and_then(|p| column.get(p));
            if let Some(parent_value) = parent_value {
                let value = match column {
                    Column::Path => tree.path_for(node, Some(parent_value))?,
                    Column::Explicit => tree.explicit_path_for(node, Some(parent_value))?,
                };
                resolved.push((node.id.clone(), value));
            }
        }

        let count = resolved.len();
        for (id, value) in resolved {
            if let Some(node) = rows.get_mut(&id) {
                column.set(node, value);
            }
        }
        trace!(node_type = %tree.node_type, ?column, count, "resolved level");
        Ok(count)
    }
}

#[derive(Debug, Clone, Copy)]
enum Column {
    Path,
    Explicit,
}

impl Column {
    fn get(self, node: &Node) -> Option<&TreePath> {
        match self {
            Column::Path => node.path.as_ref(),
            Column::Explicit => node.explicit_path.as_ref(),
        }
    }

    fn set(self, node: &mut Node, value: TreePath) {
        match self {
            Column::Path => node.path = Some(value),
            Column::Explicit => node.explicit_path = Some(value),
        }
    }
}

impl PathStore for MemoryStore {
    fn get(&self, _tree: &TreeConfig, id: &NodeId) -> TreeResult<Option<Node>> {
        Ok(self.rows.read().get(id).cloned())
    }

    fn get_many(&self, _tree: &TreeConfig, ids: &[NodeId]) -> TreeResult<Vec<Node>> {
        let rows = self.rows.read();
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }

    fn fetch_where(&self, tree: &TreeConfig, filter: &RowFilter) -> TreeResult<Vec<Node>> {
        let rows = self.rows.read();
        Ok(rows
            .values()
            .filter(|n| filter.matches(n, tree.separator))
            .cloned()
            .collect())
    }

    fn update_where(
        &self,
        tree: &TreeConfig,
        filter: &RowFilter,
        fields: &[FieldUpdate],
    ) -> TreeResult<usize> {
        let (_writer, mut rows) = self.lock_rows();
        let mut count = 0;
        for node in rows.values_mut() {
            if filter.matches(node, tree.separator) {
                for field in fields {
                    field.apply(node);
                }
                count += 1;
            }
        }
        trace!(node_type = %tree.node_type, %filter, count, "updated rows");
        Ok(count)
    }

    fn rewrite_prefix(&self, tree: &TreeConfig, rewrite: &PrefixRewrite) -> TreeResult<usize> {
        let (_writer, mut rows) = self.lock_rows();
        let mut count = 0;
        for node in rows.values_mut() {
            if rewrite.apply(node, tree.separator) {
                count += 1;
            }
        }
        trace!(
            node_type = %tree.node_type,
            old = %rewrite.old,
            new = %rewrite.new,
            count,
            "rewrote path prefix"
        );
        Ok(count)
    }

    fn assign_root_paths(&self, tree: &TreeConfig) -> TreeResult<usize> {
        let (_writer, mut rows) = self.lock_rows();
        let mut count = 0;
        for node in rows.values_mut().filter(|n| n.parent_id.is_none()) {
            node.path = Some(tree.path_for(node, None)?);
            if tree.has_explicit_path() {
                node.explicit_path = Some(tree.explicit_path_for(node, None)?);
            }
            count += 1;
        }
        Ok(count)
    }

    fn resolve_next_level(&self, tree: &TreeConfig) -> TreeResult<usize> {
        self.resolve_level(tree, Column::Path)
    }

    fn resolve_next_explicit_level(&self, tree: &TreeConfig) -> TreeResult<usize> {
        self.resolve_level(tree, Column::Explicit)
    }

    fn exists_where(&self, tree: &TreeConfig, filter: &RowFilter) -> TreeResult<bool> {
        let rows = self.rows.read();
        Ok(rows.values().any(|n| filter.matches(n, tree.separator)))
    }

    fn transaction(&self) -> TreeResult<Box<dyn StoreTransaction + '_>> {
        let writer = self.writer.lock();
        let snapshot = self.rows.read().clone();
        debug!(rows = snapshot.len(), "transaction started");
        Ok(Box::new(MemoryTransaction {
            store: self,
            snapshot: Some(snapshot),
            _writer: writer,
        }))
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("rows", &self.len())
            .finish()
    }
}

/// Transaction over a [`MemoryStore`]; restores the snapshot unless committed.
struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    snapshot: Option<BTreeMap<NodeId, Node>>,
    _writer: ReentrantMutexGuard<'a, ()>,
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn commit(mut self: Box<Self>) -> TreeResult<()> {
        self.snapshot = None;
        debug!("transaction committed");
        Ok(())
    }
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            debug!(rows = snapshot.len(), "transaction rolled back");
            *self.store.rows.write() = snapshot;
        }
    }
}
