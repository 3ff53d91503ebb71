//! Pairwise tree predicates.
//!
//! Parent/child/sibling tests compare parent keys directly. Ancestor and
//! descendant tests compare paths, with the separator appended to the
//! ancestor side so that `/1/2` never matches `/1/20`. A node without a
//! computed path is neither ancestor nor descendant of anything.

use matpath::{DepthBase, Node, TreeConfig};

use crate::error::TreeResult;
use crate::filter::RowFilter;
use crate::traits::PathStore;

/// Returns true if the node has no parent.
pub fn is_root(node: &Node) -> bool {
    node.parent_id.is_none()
}

/// Returns true if no row has `node` as its parent.
pub fn is_leaf(store: &dyn PathStore, tree: &TreeConfig, node: &Node) -> TreeResult<bool> {
    let has_children =
        store.exists_where(tree, &RowFilter::ParentEq(Some(node.id.clone())))?;
    Ok(!has_children)
}

/// Returns true if both nodes share the same parent (two roots are siblings).
pub fn is_sibling_of(a: &Node, b: &Node) -> bool {
    a.parent_id == b.parent_id
}

/// Returns true if `a` is the direct parent of `b`.
pub fn is_parent_of(a: &Node, b: &Node) -> bool {
    b.parent_id.as_ref() == Some(&a.id)
}

/// Returns true if `a` is a direct child of `b`.
pub fn is_child_of(a: &Node, b: &Node) -> bool {
    is_parent_of(b, a)
}

/// Returns true if `a` is a strict ancestor of `b`.
pub fn is_ancestor_of(a: &Node, b: &Node, separator: char) -> bool {
    match (&a.path, &b.path) {
        (Some(pa), Some(pb)) => pa.is_ancestor_of(pb, separator),
        _ => false,
    }
}

/// Returns true if `a` is a strict descendant of `b`.
pub fn is_descendant_of(a: &Node, b: &Node, separator: char) -> bool {
    is_ancestor_of(b, a, separator)
}

/// Depth of the node under the given convention; `None` until computed.
pub fn depth(node: &Node, separator: char, base: DepthBase) -> Option<usize> {
    node.depth(separator, base)
}
