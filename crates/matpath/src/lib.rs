//! # matpath
//!
//! Data model for trees stored in flat tables with the **materialized path**
//! technique.
//!
//! Every row keeps, next to its nullable parent key, a string holding the
//! whole key chain from the root down to itself:
//!
//! | id | parent_id | path      |
//! |----|-----------|-----------|
//! | 1  | NULL      | `/1`      |
//! | 2  | 1         | `/1/2`    |
//! | 4  | 2         | `/1/2/4`  |
//! | 20 | 1         | `/1/20`   |
//!
//! "All descendants of 2" becomes `path LIKE '/1/2/%'` and "all ancestors of
//! 4" becomes `'/1/2/4' LIKE path || '/%'`. The trailing separator is
//! mandatory: `/1/2` is a string prefix of `/1/20` but not its ancestor.
//!
//! This crate provides:
//! - [`NodeId`] and [`Node`]: row types
//! - [`TreePath`]: a validated path, parsed with nom
//! - [`TreeConfig`]: column names, separator, explicit path and depth origin
//!   for one node type
//!
//! Path maintenance and batched queries live in `matpath-engine`.
//!
//! ## Usage
//!
//! ```rust
//! use matpath::{Node, TreeConfig, TreePath};
//!
//! let config = TreeConfig::default();
//! let root = Node::root(1u64);
//! let root_path = config.path_for(&root, None).unwrap();
//!
//! let child = Node::child_of(2u64, 1u64);
//! let child_path = config.path_for(&child, Some(&root_path)).unwrap();
//!
//! assert_eq!(child_path, TreePath::parse("/1/2", '/').unwrap());
//! assert!(root_path.is_ancestor_of(&child_path, config.separator));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod config;
mod error;
mod node;
mod path;

pub use config::{DepthBase, ExplicitPathConfig, TreeConfig, TreeConfigBuilder};
pub use error::{PathError, PathResult};
pub use node::{Node, NodeId};
pub use path::{validate_segment, TreePath};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        let _: Option<TreeConfig> = None;
        let _: Option<Node> = None;
        let _: Option<PathResult<TreePath>> = None;
        let _ = DepthBase::default();
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_node_serde_is_transparent() {
        let node = Node::child_of(2u64, 1u64).with_path(TreePath::parse("/1/2", '/').unwrap());
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["id"], "2");
        assert_eq!(json["path"], "/1/2");

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }
}
