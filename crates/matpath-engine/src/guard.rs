//! Reparenting with cycle detection.
//!
//! Every check runs against the rows currently in the store, before any
//! write: a rejected move leaves both the parent key and the paths untouched.

use matpath::{Node, NodeId, TreeConfig};
use tracing::{debug, warn};

use crate::computer::PathComputer;
use crate::error::{TreeError, TreeResult};
use crate::filter::{FieldUpdate, RowFilter};
use crate::result::UpdateReport;
use crate::traits::PathStore;
use crate::traverser::HierarchyTraverser;

/// Validates and applies parent changes.
pub struct CycleGuard<'a> {
    store: &'a dyn PathStore,
    max_depth: usize,
}

impl<'a> CycleGuard<'a> {
    /// Creates a guard bounded by `max_depth` levels.
    pub fn new(store: &'a dyn PathStore, max_depth: usize) -> Self {
        Self { store, max_depth }
    }

    /// Fails if `parent` is `child` or one of its descendants.
    ///
    /// Uses the stored paths when both are computed, the parent key chain
    /// otherwise.
    pub fn check_parent(&self, tree: &TreeConfig, child: &Node, parent: &Node) -> TreeResult<()> {
        if child.id == parent.id {
            return Err(self.reject(tree, child, parent));
        }
        let child_row = self.load(tree, &child.id)?;
        let parent_row = self.load(tree, &parent.id)?;

        let closes_cycle = match (&child_row.path, &parent_row.path) {
            (Some(child_path), Some(parent_path)) => {
                child_path.is_ancestor_of(parent_path, tree.separator)
            }
            _ => HierarchyTraverser::new(self.store, tree, self.max_depth)
                .has_ancestor(&parent_row, &child_row.id)?,
        };
        if closes_cycle {
            return Err(self.reject(tree, child, parent));
        }
        Ok(())
    }

    /// Moves `node` under `parent`, or makes it a root for `None`.
    pub fn set_as_child_of(
        &self,
        tree: &TreeConfig,
        node: &mut Node,
        parent: Option<&Node>,
    ) -> TreeResult<UpdateReport> {
        let Some(parent) = parent else {
            return self.set_as_root(tree, node);
        };
        self.check_parent(tree, node, parent)?;
        self.persist_parent(tree, node, Some(parent.id.clone()))?;
        PathComputer::new(self.store, self.max_depth).refresh_path(tree, node)
    }

    /// Moves `child` under `node`.
    pub fn set_as_parent_of(
        &self,
        tree: &TreeConfig,
        node: &Node,
        child: &mut Node,
    ) -> TreeResult<UpdateReport> {
        self.check_parent(tree, child, node)?;
        self.persist_parent(tree, child, Some(node.id.clone()))?;
        PathComputer::new(self.store, self.max_depth).refresh_path(tree, child)
    }

    /// Detaches `node` from its parent.
    pub fn set_as_root(&self, tree: &TreeConfig, node: &mut Node) -> TreeResult<UpdateReport> {
        self.persist_parent(tree, node, None)?;
        PathComputer::new(self.store, self.max_depth).refresh_path(tree, node)
    }

    /// Writes the parent key, then reloads the row into `node`.
    fn persist_parent(
        &self,
        tree: &TreeConfig,
        node: &mut Node,
        parent_id: Option<NodeId>,
    ) -> TreeResult<()> {
        let written = self.store.update_where(
            tree,
            &RowFilter::IdEq(node.id.clone()),
            &[FieldUpdate::Parent(parent_id)],
        )?;
        if written == 0 {
            return Err(TreeError::NodeNotFound(node.id.clone()));
        }
        *node = self.load(tree, &node.id)?;
        debug!(
            node_type = %tree.node_type,
            node_id = %node.id,
            parent_id = ?node.parent_id.as_ref().map(NodeId::as_str),
            "parent changed"
        );
        Ok(())
    }

    fn load(&self, tree: &TreeConfig, id: &NodeId) -> TreeResult<Node> {
        self.store
            .get(tree, id)?
            .ok_or_else(|| TreeError::NodeNotFound(id.clone()))
    }

    fn reject(&self, tree: &TreeConfig, child: &Node, parent: &Node) -> TreeError {
        warn!(
            node_type = %tree.node_type,
            node_id = %child.id,
            parent_id = %parent.id,
            "rejected parent change that would close a cycle"
        );
        TreeError::circular(tree.node_type.clone(), Some(child.id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockStore;

    fn id(n: u64) -> NodeId {
        NodeId::from(n)
    }

    fn chain_with_paths() -> MockStore {
        MockStore::with_paths(&[
            (1, None, "/1"),
            (2, Some(1), "/1/2"),
            (4, Some(2), "/1/2/4"),
            (3, None, "/3"),
        ])
    }

    #[test]
    fn test_child_of_descendant_rejected() {
        let store = chain_with_paths();
        let tree = TreeConfig::default();
        let guard = CycleGuard::new(&store, 32);

        let mut one = store.node(1);
        let four = store.node(4);
        let err = guard.set_as_child_of(&tree, &mut one, Some(&four)).unwrap_err();

        assert!(err.is_circular());
        assert_eq!(store.node(1).parent_id, None);
        assert_eq!(store.path_of(1).as_deref(), Some("/1"));
    }

    #[test]
    fn test_rejected_without_paths() {
        let store = MockStore::from_links(&[(1, None), (2, Some(1)), (4, Some(2))]);
        let tree = TreeConfig::default();
        let guard = CycleGuard::new(&store, 32);

        let mut one = store.node(1);
        let err = guard
            .set_as_child_of(&tree, &mut one, Some(&store.node(4)))
            .unwrap_err();
        assert!(err.is_circular());
        assert_eq!(store.node(1).parent_id, None);
    }

    #[test]
    fn test_self_parent_rejected() {
        let store = chain_with_paths();
        let tree = TreeConfig::default();
        let guard = CycleGuard::new(&store, 32);

        let mut two = store.node(2);
        let same = two.clone();
        assert!(guard.set_as_child_of(&tree, &mut two, Some(&same)).is_err());
    }

    #[test]
    fn test_parent_of_ancestor_rejected() {
        let store = chain_with_paths();
        let tree = TreeConfig::default();
        let guard = CycleGuard::new(&store, 32);

        let mut one = store.node(1);
        let err = guard
            .set_as_parent_of(&tree, &store.node(4), &mut one)
            .unwrap_err();
        assert!(err.is_circular());
    }

    #[test]
    fn test_valid_move_refreshes_paths() {
        let store = chain_with_paths();
        let tree = TreeConfig::default();
        let guard = CycleGuard::new(&store, 32);

        let mut two = store.node(2);
        let report = guard
            .set_as_child_of(&tree, &mut two, Some(&store.node(3)))
            .unwrap();

        assert_eq!(report.affected_rows, 2);
        assert_eq!(two.parent_id, Some(id(3)));
        assert_eq!(store.path_of(2).as_deref(), Some("/3/2"));
        assert_eq!(store.path_of(4).as_deref(), Some("/3/2/4"));
    }

    #[test]
    fn test_set_as_parent_of_moves_child() {
        let store = chain_with_paths();
        let tree = TreeConfig::default();
        let guard = CycleGuard::new(&store, 32);

        let mut four = store.node(4);
        guard.set_as_parent_of(&tree, &store.node(3), &mut four).unwrap();
        assert_eq!(store.path_of(4).as_deref(), Some("/3/4"));
    }

    #[test]
    fn test_set_as_root() {
        let store = chain_with_paths();
        let tree = TreeConfig::default();
        let guard = CycleGuard::new(&store, 32);

        let mut two = store.node(2);
        guard.set_as_child_of(&tree, &mut two, None).unwrap();

        assert!(two.is_root());
        assert_eq!(store.path_of(2).as_deref(), Some("/2"));
        assert_eq!(store.path_of(4).as_deref(), Some("/2/4"));
    }

    #[test]
    fn test_missing_node() {
        let store = chain_with_paths();
        let tree = TreeConfig::default();
        let guard = CycleGuard::new(&store, 32);

        let mut ghost = Node::root(77u64);
        let err = guard.set_as_root(&tree, &mut ghost).unwrap_err();
        assert!(matches!(err, TreeError::NodeNotFound(_)));
    }
}
