//! Hierarchy traversal over parent keys.
//!
//! Path maintenance cannot rely on paths while it is repairing them, so this
//! module walks the raw `parent_id` links through the store: upward to find
//! the ancestors that must be computed first, and downward with a FIFO
//! worklist (root-to-leaf order) to propagate a change to a subtree.
//! Both directions are bounded by the configured maximum depth.

use std::collections::{HashSet, VecDeque};

use matpath::{Node, NodeId, TreeConfig};

use crate::error::{TreeError, TreeResult};
use crate::traits::PathStore;

/// Walks a tree through its parent keys.
pub struct HierarchyTraverser<'a> {
    store: &'a dyn PathStore,
    tree: &'a TreeConfig,
    max_depth: usize,
}

impl<'a> HierarchyTraverser<'a> {
    /// Creates a traverser for one node type.
    pub fn new(store: &'a dyn PathStore, tree: &'a TreeConfig, max_depth: usize) -> Self {
        Self {
            store,
            tree,
            max_depth,
        }
    }

    /// Loads the parent row of `node`.
    ///
    /// Returns `None` for a root and [`TreeError::ParentNotFound`] for a
    /// dangling parent key.
    pub fn parent_of(&self, node: &Node) -> TreeResult<Option<Node>> {
        let Some(parent_id) = &node.parent_id else {
            return Ok(None);
        };
        match self.store.get(self.tree, parent_id)? {
            Some(parent) => Ok(Some(parent)),
            None => Err(TreeError::ParentNotFound {
                node_id: node.id.clone(),
                parent_id: parent_id.clone(),
            }),
        }
    }

    /// Climbs from the parent of `node` towards the root, nearest first.
    ///
    /// Stops after the first ancestor for which `stop` returns true (it is
    /// included) or at the root. Revisiting a key or climbing more than
    /// `max_depth` levels fails with [`TreeError::CircularTreeRelation`].
    pub fn ancestors_until(
        &self,
        node: &Node,
        mut stop: impl FnMut(&Node) -> bool,
    ) -> TreeResult<Vec<Node>> {
        let mut chain = Vec::new();
        let mut seen: HashSet<NodeId> = HashSet::new();
        seen.insert(node.id.clone());

        let mut current = self.parent_of(node)?;
        while let Some(ancestor) = current {
            if !seen.insert(ancestor.id.clone()) || chain.len() >= self.max_depth {
                return Err(TreeError::circular(
                    self.tree.node_type.clone(),
                    Some(ancestor.id),
                ));
            }
            let done = stop(&ancestor);
            current = if done { None } else { self.parent_of(&ancestor)? };
            chain.push(ancestor);
        }

        Ok(chain)
    }

    /// Returns true if `candidate` is on the parent chain of `node`.
    pub fn has_ancestor(&self, node: &Node, candidate: &NodeId) -> TreeResult<bool> {
        let chain = self.ancestors_until(node, |a| &a.id == candidate)?;
        Ok(chain.last().is_some_and(|a| &a.id == candidate))
    }

    /// Breadth-first walk below `start`, children fetched from the store.
    ///
    /// `visit` receives each child and the state produced for its parent; it
    /// returns the state for the child's own children, or `None` to prune
    /// the branch. Nodes are visited level by level, root to leaf.
    pub fn walk_down<S>(
        &self,
        start: &Node,
        state: S,
        mut visit: impl FnMut(&Node, &S) -> TreeResult<Option<S>>,
    ) -> TreeResult<()> {
        let mut queue: VecDeque<(NodeId, S, usize)> = VecDeque::new();
        queue.push_back((start.id.clone(), state, 0));

        while let Some((id, parent_state, depth)) = queue.pop_front() {
            if depth > self.max_depth {
                return Err(TreeError::circular(self.tree.node_type.clone(), Some(id)));
            }
            for child in self.store.children_of(self.tree, &id)? {
                if let Some(child_state) = visit(&child, &parent_state)? {
                    queue.push_back((child.id, child_state, depth + 1));
                }
            }
        }

        Ok(())
    }
}
