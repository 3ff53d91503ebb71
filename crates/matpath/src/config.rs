//! Per node type tree configuration.

use crate::error::PathResult;
use crate::node::Node;
use crate::path::TreePath;

/// Where depth counting starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DepthBase {
    /// Roots have depth 0.
    #[default]
    RootIsZero,
    /// Roots have depth 1.
    RootIsOne,
}

/// Explicit path column, built from a human-readable property.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExplicitPathConfig {
    /// Column holding the explicit path.
    pub column: String,
    /// Property whose value forms each segment.
    pub property: String,
}

/// Configuration of one node type.
///
/// Passed explicitly into every engine and store operation so that node
/// types with different layouts can coexist.
///
/// # Example
///
/// ```rust
/// use matpath::{DepthBase, TreeConfig};
///
/// let config = TreeConfig::builder("category")
///     .with_separator('.')
///     .with_path_column("lineage")
///     .with_explicit_path("slug_path", "slug")
///     .with_depth_base(DepthBase::RootIsOne)
///     .build();
///
/// assert_eq!(config.node_type, "category");
/// assert_eq!(config.separator, '.');
/// assert!(config.has_explicit_path());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeConfig {
    /// Name of the node type (table/model), used in errors.
    pub node_type: String,
    /// Column holding the parent key.
    pub parent_column: String,
    /// Column holding the materialized path.
    pub path_column: String,
    /// Path separator; must never occur inside a key's string form.
    pub separator: char,
    /// Explicit path column (None = not maintained).
    pub explicit_path: Option<ExplicitPathConfig>,
    /// Depth origin.
    pub depth_base: DepthBase,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfigBuilder::new("node").build()
    }
}

impl TreeConfig {
    /// Creates a new builder for the given node type.
    pub fn builder(node_type: impl Into<String>) -> TreeConfigBuilder {
        TreeConfigBuilder::new(node_type)
    }

    /// Returns true if an explicit path column is maintained.
    pub fn has_explicit_path(&self) -> bool {
        self.explicit_path.is_some()
    }

    /// Computes the path `node` should have under a parent with `parent_path`.
    pub fn path_for(&self, node: &Node, parent_path: Option<&TreePath>) -> PathResult<TreePath> {
        match parent_path {
            Some(parent) => parent.child(node.id.as_str(), self.separator),
            None => TreePath::root(node.id.as_str(), self.separator),
        }
    }

    /// Computes the explicit path `node` should have under `parent_explicit`.
    pub fn explicit_path_for(
        &self,
        node: &Node,
        parent_explicit: Option<&TreePath>,
    ) -> PathResult<TreePath> {
        match parent_explicit {
            Some(parent) => parent.child(node.explicit_segment(), self.separator),
            None => TreePath::root(node.explicit_segment(), self.separator),
        }
    }
}

/// Builder for TreeConfig.
#[derive(Debug, Clone)]
pub struct TreeConfigBuilder {
    node_type: String,
    parent_column: String,
    path_column: String,
    separator: char,
    explicit_path: Option<ExplicitPathConfig>,
    depth_base: DepthBase,
}

impl TreeConfigBuilder {
    fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            parent_column: "parent_id".to_string(),
            path_column: "path".to_string(),
            separator: '/',
            explicit_path: None,
            depth_base: DepthBase::default(),
        }
    }

    /// Sets the parent column name.
    pub fn with_parent_column(mut self, column: impl Into<String>) -> Self {
        self.parent_column = column.into();
        self
    }

    /// Sets the path column name.
    pub fn with_path_column(mut self, column: impl Into<String>) -> Self {
        self.path_column = column.into();
        self
    }

    /// Sets the path separator.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Maintains an explicit path in `column`, built from `property`.
    pub fn with_explicit_path(
        mut self,
        column: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        self.explicit_path = Some(ExplicitPathConfig {
            column: column.into(),
            property: property.into(),
        });
        self
    }

    /// Sets the depth origin.
    pub fn with_depth_base(mut self, depth_base: DepthBase) -> Self {
        self.depth_base = depth_base;
        self
    }

    /// Builds the TreeConfig.
    pub fn build(self) -> TreeConfig {
        TreeConfig {
            node_type: self.node_type,
            parent_column: self.parent_column,
            path_column: self.path_column,
            separator: self.separator,
            explicit_path: self.explicit_path,
            depth_base: self.depth_base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathError;

    #[test]
    fn test_tree_config_default() {
        let config = TreeConfig::default();
        assert_eq!(config.node_type, "node");
        assert_eq!(config.parent_column, "parent_id");
        assert_eq!(config.path_column, "path");
        assert_eq!(config.separator, '/');
        assert!(!config.has_explicit_path());
        assert_eq!(config.depth_base, DepthBase::RootIsZero);
    }

    #[test]
    fn test_builder_chaining() {
        let config = TreeConfig::builder("folder")
            .with_parent_column("owner")
            .with_explicit_path("name_path", "name")
            .build();

        assert_eq!(config.parent_column, "owner");
        assert_eq!(
            config.explicit_path,
            Some(ExplicitPathConfig {
                column: "name_path".to_string(),
                property: "name".to_string(),
            })
        );
    }

    #[test]
    fn test_path_for() {
        let config = TreeConfig::default();
        let root = Node::root(1u64);
        let root_path = config.path_for(&root, None).unwrap();
        assert_eq!(root_path.as_str(), "/1");

        let child = Node::child_of(2u64, 1u64);
        assert_eq!(
            config.path_for(&child, Some(&root_path)).unwrap().as_str(),
            "/1/2"
        );
    }

    #[test]
    fn test_explicit_path_for_uses_label() {
        let config = TreeConfig::builder("page")
            .with_explicit_path("slug_path", "slug")
            .build();
        let root = Node::root(1u64).with_label("home");
        let root_explicit = config.explicit_path_for(&root, None).unwrap();
        assert_eq!(root_explicit.as_str(), "/home");

        let child = Node::child_of(2u64, 1u64).with_label("about");
        assert_eq!(
            config
                .explicit_path_for(&child, Some(&root_explicit))
                .unwrap()
                .as_str(),
            "/home/about"
        );
    }

    #[test]
    fn test_key_containing_separator_rejected() {
        let config = TreeConfig::builder("node").with_separator('.').build();
        let node = Node::root("1.5");
        assert!(matches!(
            config.path_for(&node, None),
            Err(PathError::SeparatorInSegment { .. })
        ));
    }
}
