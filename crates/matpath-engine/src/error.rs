//! Error types for tree maintenance and queries.

use matpath::{NodeId, PathError};
use thiserror::Error;

/// Errors that can occur while maintaining or querying a tree.
#[derive(Error, Debug)]
pub enum TreeError {
    /// A reparent would close a cycle, or bulk path computation did not converge.
    ///
    /// Never retried: without breaking the cycle a retry cannot succeed.
    #[error("circular tree relation in '{node_type}'{}", display_key(.node_id))]
    CircularTreeRelation {
        /// Node type the relation belongs to.
        node_type: String,
        /// Offending node, when known.
        node_id: Option<NodeId>,
    },

    /// The operation is not supported by this store or variant.
    #[error("not yet implemented: {0}")]
    NotYetImplemented(String),

    /// Node not found in the store.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// A node references a parent that does not exist.
    #[error("parent {parent_id} of node {node_id} not found")]
    ParentNotFound {
        /// The child.
        node_id: NodeId,
        /// The missing parent key.
        parent_id: NodeId,
    },

    /// Invalid path or key.
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// Error from the underlying store, passed through unchanged.
    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TreeError {
    /// Creates a cycle error for a node of the given type.
    pub fn circular(node_type: impl Into<String>, node_id: Option<NodeId>) -> Self {
        Self::CircularTreeRelation {
            node_type: node_type.into(),
            node_id,
        }
    }

    /// Wraps a store-level error.
    pub fn store(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Store(source.into())
    }

    /// Returns true for [`TreeError::CircularTreeRelation`].
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularTreeRelation { .. })
    }
}

fn display_key(node_id: &Option<NodeId>) -> String {
    match node_id {
        Some(id) => format!(" at node {id}"),
        None => String::new(),
    }
}

/// Result type for tree operations.
pub type TreeResult<T> = std::result::Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_circular_with_key() {
        let err = TreeError::circular("category", Some(NodeId::from(4u64)));
        assert_eq!(
            err.to_string(),
            "circular tree relation in 'category' at node 4"
        );
        assert!(err.is_circular());
    }

    #[test]
    fn test_error_display_circular_without_key() {
        let err = TreeError::circular("category", None);
        assert_eq!(err.to_string(), "circular tree relation in 'category'");
    }

    #[test]
    fn test_error_display_parent_not_found() {
        let err = TreeError::ParentNotFound {
            node_id: NodeId::from(5u64),
            parent_id: NodeId::from(99u64),
        };
        assert_eq!(err.to_string(), "parent 99 of node 5 not found");
    }

    #[test]
    fn test_error_from_path_error() {
        let err: TreeError = PathError::Empty.into();
        assert!(matches!(err, TreeError::Path(_)));
        assert!(!err.is_circular());
    }

    #[test]
    fn test_error_store_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = TreeError::store(io);
        assert_eq!(err.to_string(), "store error: disk gone");
        assert!(std::error::Error::source(&err).is_some());
    }
}
