//! Mock store for unit tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use matpath::{Node, NodeId, TreeConfig, TreePath};

use crate::error::TreeResult;
use crate::filter::{FieldUpdate, PrefixRewrite, RowFilter};
use crate::traits::{PathStore, StoreTransaction};

/// Mock store keeping rows ordered by key.
pub(crate) struct MockStore {
    rows: Mutex<BTreeMap<NodeId, Node>>,
}

impl MockStore {
    pub(crate) fn new() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
        }
    }

    /// Rows from `(id, parent)` pairs, no paths computed.
    pub(crate) fn from_links(links: &[(u64, Option<u64>)]) -> Self {
        let store = Self::new();
        for &(id, parent) in links {
            store.insert(Node::new(id, parent.map(NodeId::from)));
        }
        store
    }

    /// Rows from `(id, parent, path)` triples.
    pub(crate) fn with_paths(rows: &[(u64, Option<u64>, &str)]) -> Self {
        let store = Self::new();
        for &(id, parent, path) in rows {
            let mut node = Node::new(id, parent.map(NodeId::from));
            node.path = Some(TreePath::parse(path, '/').expect("valid test path"));
            store.insert(node);
        }
        store
    }

    pub(crate) fn insert(&self, node: Node) {
        self.rows.lock().unwrap().insert(node.id.clone(), node);
    }

    pub(crate) fn node(&self, id: u64) -> Node {
        self.rows
            .lock()
            .unwrap()
            .get(&NodeId::from(id))
            .cloned()
            .expect("node exists")
    }

    pub(crate) fn path_of(&self, id: u64) -> Option<String> {
        self.node(id).path.map(TreePath::into_string)
    }
}

impl PathStore for MockStore {
    fn get(&self, _tree: &TreeConfig, id: &NodeId) -> TreeResult<Option<Node>> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }

    fn get_many(&self, _tree: &TreeConfig, ids: &[NodeId]) -> TreeResult<Vec<Node>> {
        let rows = self.rows.lock().unwrap();
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }

    fn fetch_where(&self, tree: &TreeConfig, filter: &RowFilter) -> TreeResult<Vec<Node>> {
        let rows = self.rows.lock().unwrap();
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
        let mut rows = self.rows.lock().unwrap();
        let mut count = 0;
        for node in rows.values_mut() {
            if filter.matches(node, tree.separator) {
                for field in fields {
                    field.apply(node);
                }
                count += 1;
            }
        }
        Ok(count)
    }

    fn rewrite_prefix(&self, tree: &TreeConfig, rewrite: &PrefixRewrite) -> TreeResult<usize> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .values_mut()
            .map(|node| rewrite.apply(node, tree.separator))
            .filter(|hit| *hit)
            .count())
    }

    fn assign_root_paths(&self, tree: &TreeConfig) -> TreeResult<usize> {
        let mut rows = self.rows.lock().unwrap();
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
        let mut rows = self.rows.lock().unwrap();
        let mut resolved = Vec::new();
        for node in rows.values().filter(|n| n.path.is_none()) {
            let parent_path = node
                .parent_id
                .as_ref()
                .and_then(|p| rows.get(p))
                .and_then(|p| p.path.as_ref());
            if let Some(parent_path) = parent_path {
                resolved.push((node.id.clone(), tree.path_for(node, Some(parent_path))?));
            }
        }
        let count = resolved.len();
        for (id, path) in resolved {
            if let Some(node) = rows.get_mut(&id) {
                node.path = Some(path);
            }
        }
        Ok(count)
    }

    fn resolve_next_explicit_level(&self, tree: &TreeConfig) -> TreeResult<usize> {
        let mut rows = self.rows.lock().unwrap();
        let mut resolved = Vec::new();
        for node in rows.values().filter(|n| n.explicit_path.is_none()) {
            let parent_explicit = node
                .parent_id
                .as_ref()
                .and_then(|p| rows.get(p))
                .and_then(|p| p.explicit_path.as_ref());
            if let Some(parent_explicit) = parent_explicit {
                let explicit = tree.explicit_path_for(node, Some(parent_explicit))?;
                resolved.push((node.id.clone(), explicit));
            }
        }
        let count = resolved.len();
        for (id, explicit) in resolved {
            if let Some(node) = rows.get_mut(&id) {
                node.explicit_path = Some(explicit);
            }
        }
        Ok(count)
    }

    fn transaction(&self) -> TreeResult<Box<dyn StoreTransaction + '_>> {
        let snapshot = self.rows.lock().unwrap().clone();
        Ok(Box::new(MockTransaction {
            store: self,
            snapshot: Some(snapshot),
        }))
    }
}

struct MockTransaction<'a> {
    store: &'a MockStore,
    snapshot: Option<BTreeMap<NodeId, Node>>,
}

impl StoreTransaction for MockTransaction<'_> {
    fn commit(mut self: Box<Self>) -> TreeResult<()> {
        self.snapshot = None;
        Ok(())
    }
}

impl Drop for MockTransaction<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.store.rows.lock().unwrap() = snapshot;
        }
    }
}
