//! Path computation for a single node and its subtree.
//!
//! A node's path is derived from its parent's path. When the derived value
//! differs from the stored one, the node row and every row under the old
//! path are rewritten in one store call; a FIFO worklist over child rows
//! then heals whatever the rewrite could not reach (rows never computed,
//! explicit paths never set). Rows the rewrite already moved count once.

use matpath::{Node, TreeConfig, TreePath};
use tracing::debug;

use crate::error::TreeResult;
use crate::filter::{FieldUpdate, PrefixRewrite, RowFilter};
use crate::result::UpdateReport;
use crate::traits::PathStore;
use crate::traverser::HierarchyTraverser;

/// Computes and repairs materialized paths against a store.
///
/// The computer does not open transactions; callers that need atomicity
/// (such as [`crate::TreeEngine`]) wrap it.
///
/// # Example
///
/// ```rust
/// use matpath::{Node, TreeConfig};
/// use matpath_engine::PathComputer;
/// use matpath_memory::MemoryStore;
///
/// let store = MemoryStore::new();
/// store.insert(Node::root(1u64));
/// store.insert(Node::child_of(2u64, 1u64));
///
/// let tree = TreeConfig::default();
/// let computer = PathComputer::new(&store, 32);
///
/// let mut node = Node::child_of(2u64, 1u64);
/// let report = computer.update_path(&tree, &mut node).unwrap();
///
/// assert_eq!(report.affected_rows, 2);
/// assert_eq!(node.path.unwrap().as_str(), "/1/2");
/// ```
pub struct PathComputer<'a> {
    store: &'a dyn PathStore,
    max_depth: usize,
}

impl<'a> PathComputer<'a> {
    /// Creates a computer bounded by `max_depth` levels.
    pub fn new(store: &'a dyn PathStore, max_depth: usize) -> Self {
        Self { store, max_depth }
    }

    /// Recomputes the path, and the explicit path when the node type keeps one.
    pub fn refresh_path(&self, tree: &TreeConfig, node: &mut Node) -> TreeResult<UpdateReport> {
        if tree.has_explicit_path() {
            self.update_path_and_explicit_path(tree, node)
        } else {
            self.update_path(tree, node)
        }
    }

    /// Recomputes the path of `node` and propagates it to the subtree.
    ///
    /// Unresolved ancestors are computed first, root-down. Returns a no-op
    /// report when the stored path is already correct.
    pub fn update_path(&self, tree: &TreeConfig, node: &mut Node) -> TreeResult<UpdateReport> {
        self.update(tree, node, false)
    }

    /// Same as [`update_path`](Self::update_path), keeping the explicit path in step.
    pub fn update_path_and_explicit_path(
        &self,
        tree: &TreeConfig,
        node: &mut Node,
    ) -> TreeResult<UpdateReport> {
        self.update(tree, node, true)
    }

    fn update(&self, tree: &TreeConfig, node: &mut Node, explicit: bool) -> TreeResult<UpdateReport> {
        let mut report = UpdateReport::unchanged();
        let traverser = HierarchyTraverser::new(self.store, tree, self.max_depth);

        // Nearest first; every entry but the last is unresolved.
        let chain = traverser.ancestors_until(node, |a| is_resolved(a, explicit))?;
        let unresolved = chain
            .iter()
            .take_while(|a| !is_resolved(a, explicit))
            .count();
        let (pending, anchor) = chain.split_at(unresolved);

        let parent = match pending.last() {
            Some(top) => {
                // Computing the topmost pending ancestor heals the chain down to `node`.
                let mut top = top.clone();
                let anchor = anchor.first();
                let healed = self.update_one(
                    tree,
                    &mut top,
                    anchor.and_then(|a| a.path.as_ref()),
                    anchor.and_then(|a| a.explicit_path.as_ref()),
                    explicit,
                )?;
                report.merge(healed);
                if let Some(stored) = self.store.get(tree, &node.id)? {
                    node.path = stored.path;
                    node.explicit_path = stored.explicit_path;
                }
                traverser.parent_of(node)?
            }
            None => chain.first().cloned(),
        };

        let (parent_path, parent_explicit) = match &parent {
            Some(parent) => (parent.path.as_ref(), parent.explicit_path.as_ref()),
            None => (None, None),
        };
        let own = self.update_one(tree, node, parent_path, parent_explicit, explicit)?;
        report.merge(own);
        Ok(report)
    }

    /// Updates one node, then walks its children root-to-leaf.
    fn update_one(
        &self,
        tree: &TreeConfig,
        node: &mut Node,
        parent_path: Option<&TreePath>,
        parent_explicit: Option<&TreePath>,
        explicit: bool,
    ) -> TreeResult<UpdateReport> {
        let mut report = UpdateReport::unchanged();
        let new_path = tree.path_for(node, parent_path)?;
        let new_explicit = match explicit {
            true => Some(tree.explicit_path_for(node, parent_explicit)?),
            false => None,
        };

        // Rows under the old path were counted by this node's prefix rewrite.
        let covered = node.path.as_ref().is_some_and(|p| p != &new_path);
        let Some(affected) = self.apply(tree, node, &new_path, new_explicit.as_ref())? else {
            return Ok(report);
        };
        debug!(
            node_type = %tree.node_type,
            node_id = %node.id,
            path = %new_path,
            affected,
            "updated node path"
        );
        report.record(&node.id, affected);

        let traverser = HierarchyTraverser::new(self.store, tree, self.max_depth);
        traverser.walk_down(
            node,
            (new_path.clone(), new_explicit.clone(), covered),
            |child, (path, explicit_path, covered)| {
                let child_path = tree.path_for(child, Some(path))?;
                let child_explicit = match explicit {
                    true => Some(tree.explicit_path_for(child, explicit_path.as_ref())?),
                    false => None,
                };
                let moved = child.path.as_ref() != Some(&child_path);
                match self.apply(tree, child, &child_path, child_explicit.as_ref())? {
                    Some(affected) => {
                        let counted = if *covered && !moved { 0 } else { affected };
                        report.record(&child.id, counted);
                        let covered = *covered || (moved && child.path.is_some());
                        Ok(Some((child_path, child_explicit, covered)))
                    }
                    None => Ok(None),
                }
            },
        )?;

        node.path = Some(new_path);
        if explicit {
            node.explicit_path = new_explicit;
        }
        Ok(report)
    }

    /// Writes the new path of one row; `None` when it is already correct.
    fn apply(
        &self,
        tree: &TreeConfig,
        node: &Node,
        new_path: &TreePath,
        new_explicit: Option<&TreePath>,
    ) -> TreeResult<Option<usize>> {
        let path_changed = node.path.as_ref() != Some(new_path);
        let explicit_changed =
            new_explicit.is_some_and(|e| node.explicit_path.as_ref() != Some(e));
        if !path_changed && !explicit_changed {
            return Ok(None);
        }

        let Some(current) = &node.path else {
            let mut fields = vec![FieldUpdate::Path(Some(new_path.clone()))];
            if let Some(explicit) = new_explicit {
                fields.push(FieldUpdate::ExplicitPath(Some(explicit.clone())));
            }
            let filter =
                RowFilter::And(vec![RowFilter::IdEq(node.id.clone()), RowFilter::PathIsNull]);
            return self.store.update_where(tree, &filter, &fields).map(Some);
        };

        let mut rewrite = PrefixRewrite::new(current.clone(), new_path.clone());
        if let Some(explicit) = new_explicit.filter(|_| explicit_changed) {
            match &node.explicit_path {
                Some(old) => rewrite = rewrite.with_explicit(old.clone(), explicit.clone()),
                None => {
                    let written = self.store.update_where(
                        tree,
                        &RowFilter::IdEq(node.id.clone()),
                        &[FieldUpdate::ExplicitPath(Some(explicit.clone()))],
                    )?;
                    if !path_changed {
                        return Ok(Some(written));
                    }
                }
            }
        }
        self.store.rewrite_prefix(tree, &rewrite).map(Some)
    }
}

fn is_resolved(node: &Node, explicit: bool) -> bool {
    node.path.is_some() && (!explicit || node.explicit_path.is_some())
}
