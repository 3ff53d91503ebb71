//! Node key and row types.

use std::fmt;

use crate::config::DepthBase;
use crate::path::TreePath;

/// Opaque, comparable node key.
///
/// Keys are compared and embedded in paths by their string form, so numeric
/// ids order lexicographically (`"10" < "2"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(String);

impl NodeId {
    /// Creates a key from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// A row of a tree table.
///
/// `path` and `explicit_path` are derived state owned by the tree as a whole:
/// moving one node can rewrite the paths of an unbounded number of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    /// Unique key.
    pub id: NodeId,
    /// Parent key (`None` = root).
    pub parent_id: Option<NodeId>,
    /// Materialized path (`None` = not computed yet).
    pub path: Option<TreePath>,
    /// Path built from labels instead of keys, when the node type keeps one.
    pub explicit_path: Option<TreePath>,
    /// Human-readable property the explicit path is built from.
    pub label: Option<String>,
}

impl Node {
    /// Creates a node with no computed paths.
    pub fn new(id: impl Into<NodeId>, parent_id: Option<NodeId>) -> Self {
        Self {
            id: id.into(),
            parent_id,
            path: None,
            explicit_path: None,
            label: None,
        }
    }

    /// Creates a root node.
    pub fn root(id: impl Into<NodeId>) -> Self {
        Self::new(id, None)
    }

    /// Creates a node under `parent`.
    pub fn child_of(id: impl Into<NodeId>, parent: impl Into<NodeId>) -> Self {
        Self::new(id, Some(parent.into()))
    }

    /// Sets the label used for the explicit path.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets a precomputed path.
    pub fn with_path(mut self, path: TreePath) -> Self {
        self.path = Some(path);
        self
    }

    /// Returns true if the node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Segment used in the explicit path: the label, or the key when unlabeled.
    pub fn explicit_segment(&self) -> &str {
        self.label.as_deref().unwrap_or(self.id.as_str())
    }

    /// Depth derived from the path; `None` until the path is computed.
    pub fn depth(&self, separator: char, base: DepthBase) -> Option<usize> {
        self.path.as_ref().map(|p| p.depth(separator, base))
    }
}
