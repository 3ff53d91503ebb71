//! Row filters, field updates and prefix rewrites understood by a store.
//!
//! [`RowFilter::matches`] and [`PrefixRewrite::apply`] define the exact
//! semantics; a SQL-backed store translates them into `WHERE` clauses and
//! `UPDATE ... SET path = :new || substr(path, :len)`.

use std::fmt;

use matpath::{Node, NodeId, TreePath};

/// Predicate over rows of one node type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFilter {
    /// Every row.
    All,
    /// `id = :id`
    IdEq(NodeId),
    /// `parent_id = :id`, or `parent_id IS NULL` for `None`.
    ParentEq(Option<NodeId>),
    /// `path = :path`
    PathEq(TreePath),
    /// `path IS NULL`
    PathIsNull,
    /// `path IS NOT NULL`
    PathIsNotNull,
    /// `path LIKE :prefix || '%'`
    PathStartsWith(String),
    /// `:path LIKE row.path || separator || '%'` (the row is a strict ancestor of `:path`).
    PathIsAncestorOf(TreePath),
    /// Conjunction.
    And(Vec<RowFilter>),
    /// Disjunction.
    Or(Vec<RowFilter>),
}

impl RowFilter {
    /// Evaluates the filter against one row.
    pub fn matches(&self, node: &Node, separator: char) -> bool {
        match self {
            RowFilter::All => true,
            RowFilter::IdEq(id) => &node.id == id,
            RowFilter::ParentEq(parent) => &node.parent_id == parent,
            RowFilter::PathEq(path) => node.path.as_ref() == Some(path),
            RowFilter::PathIsNull => node.path.is_none(),
            RowFilter::PathIsNotNull => node.path.is_some(),
            RowFilter::PathStartsWith(prefix) => node
                .path
                .as_ref()
                .is_some_and(|p| p.as_str().starts_with(prefix.as_str())),
            RowFilter::PathIsAncestorOf(target) => node
                .path
                .as_ref()
                .is_some_and(|p| p.is_ancestor_of(target, separator)),
            RowFilter::And(filters) => filters.iter().all(|f| f.matches(node, separator)),
            RowFilter::Or(filters) => filters.iter().any(|f| f.matches(node, separator)),
        }
    }

    /// Number of top-level OR branches (1 for any other filter).
    pub fn branch_count(&self) -> usize {
        match self {
            RowFilter::Or(filters) => filters.len(),
            _ => 1,
        }
    }
}

impl fmt::Display for RowFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowFilter::All => write!(f, "TRUE"),
            RowFilter::IdEq(id) => write!(f, "id = '{id}'"),
            RowFilter::ParentEq(Some(id)) => write!(f, "parent = '{id}'"),
            RowFilter::ParentEq(None) => write!(f, "parent IS NULL"),
            RowFilter::PathEq(path) => write!(f, "path = '{path}'"),
            RowFilter::PathIsNull => write!(f, "path IS NULL"),
            RowFilter::PathIsNotNull => write!(f, "path IS NOT NULL"),
            RowFilter::PathStartsWith(prefix) => write!(f, "path LIKE '{prefix}%'"),
            RowFilter::PathIsAncestorOf(path) => write!(f, "'{path}' LIKE path || sep || '%'"),
            RowFilter::And(filters) => write_joined(f, filters, " AND "),
            RowFilter::Or(filters) => write_joined(f, filters, " OR "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, filters: &[RowFilter], op: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            f.write_str(op)?;
        }
        write!(f, "{filter}")?;
    }
    write!(f, ")")
}

/// A column assignment applied by [`crate::PathStore::update_where`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    /// Sets the parent key.
    Parent(Option<NodeId>),
    /// Sets the path.
    Path(Option<TreePath>),
    /// Sets the explicit path.
    ExplicitPath(Option<TreePath>),
}

impl FieldUpdate {
    /// Applies the assignment to a row.
    pub fn apply(&self, node: &mut Node) {
        match self {
            FieldUpdate::Parent(parent) => node.parent_id = parent.clone(),
            FieldUpdate::Path(path) => node.path = path.clone(),
            FieldUpdate::ExplicitPath(path) => node.explicit_path = path.clone(),
        }
    }
}

/// Replaces a path prefix for a node row and every row under it.
///
/// Rows are selected by `path`: the row whose path equals `old` and every row
/// whose path starts with `old + separator`. When `explicit` is set, the
/// explicit path of the same rows gets the matching prefix replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRewrite {
    /// Current path of the moved node.
    pub old: TreePath,
    /// New path of the moved node.
    pub new: TreePath,
    /// Old and new explicit path of the moved node.
    pub explicit: Option<(TreePath, TreePath)>,
}

impl PrefixRewrite {
    /// Creates a rewrite of the `path` column only.
    pub fn new(old: TreePath, new: TreePath) -> Self {
        Self {
            old,
            new,
            explicit: None,
        }
    }

    /// Also rewrites the explicit path column.
    pub fn with_explicit(mut self, old: TreePath, new: TreePath) -> Self {
        self.explicit = Some((old, new));
        self
    }

    /// Filter selecting the rows this rewrite touches.
    pub fn selection(&self, separator: char) -> RowFilter {
        RowFilter::Or(vec![
            RowFilter::PathEq(self.old.clone()),
            RowFilter::PathStartsWith(self.old.descendant_prefix(separator)),
        ])
    }

    /// Applies the rewrite to one row; returns true if the row was selected.
    pub fn apply(&self, node: &mut Node, separator: char) -> bool {
        let Some(rewritten) = node
            .path
            .as_ref()
            .and_then(|p| p.rewrite_prefix(&self.old, &self.new, separator))
        else {
            return false;
        };
        node.path = Some(rewritten);

        if let Some((old, new)) = &self.explicit {
            if let Some(explicit) = node
                .explicit_path
                .as_ref()
                .and_then(|p| p.rewrite_prefix(old, new, separator))
            {
                node.explicit_path = Some(explicit);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> TreePath {
        TreePath::parse(s, '/').unwrap()
    }

    fn node(id: u64, parent: Option<u64>, p: Option<&str>) -> Node {
        let mut n = Node::new(id, parent.map(NodeId::from));
        n.path = p.map(path);
        n
    }

    #[test]
    fn test_filter_matches_basic() {
        let n = node(4, Some(2), Some("/1/2/4"));

        assert!(RowFilter::All.matches(&n, '/'));
        assert!(RowFilter::IdEq(NodeId::from(4u64)).matches(&n, '/'));
        assert!(RowFilter::ParentEq(Some(NodeId::from(2u64))).matches(&n, '/'));
        assert!(!RowFilter::ParentEq(None).matches(&n, '/'));
        assert!(RowFilter::PathIsNotNull.matches(&n, '/'));
        assert!(!RowFilter::PathIsNull.matches(&n, '/'));
        assert!(RowFilter::PathStartsWith("/1/2/".to_string()).matches(&n, '/'));
    }

    #[test]
    fn test_filter_starts_with_respects_separator_in_prefix() {
        let twenty = node(20, Some(1), Some("/1/20"));
        assert!(!RowFilter::PathStartsWith("/1/2/".to_string()).matches(&twenty, '/'));
    }

    #[test]
    fn test_filter_ancestor_of() {
        let root = node(1, None, Some("/1"));
        let two = node(2, Some(1), Some("/1/2"));
        let twenty = node(20, Some(1), Some("/1/20"));
        let filter = RowFilter::PathIsAncestorOf(path("/1/20/7"));

        assert!(filter.matches(&root, '/'));
        assert!(!filter.matches(&two, '/'));
        assert!(filter.matches(&twenty, '/'));
    }

    #[test]
    fn test_filter_null_path_never_matches_prefix() {
        let n = node(3, None, None);
        assert!(!RowFilter::PathStartsWith("/".to_string()).matches(&n, '/'));
        assert!(RowFilter::And(vec![RowFilter::IdEq(NodeId::from(3u64)), RowFilter::PathIsNull])
            .matches(&n, '/'));
    }

    #[test]
    fn test_branch_count() {
        assert_eq!(RowFilter::All.branch_count(), 1);
        assert_eq!(
            RowFilter::Or(vec![RowFilter::All, RowFilter::PathIsNull]).branch_count(),
            2
        );
    }

    #[test]
    fn test_filter_display() {
        let filter = RowFilter::Or(vec![
            RowFilter::PathStartsWith("/1/2/".to_string()),
            RowFilter::PathStartsWith("/7/".to_string()),
        ]);
        assert_eq!(filter.to_string(), "(path LIKE '/1/2/%' OR path LIKE '/7/%')");
    }

    #[test]
    fn test_prefix_rewrite_apply() {
        let rewrite = PrefixRewrite::new(path("/1/2"), path("/1/3/2"));

        let mut moved = node(2, Some(3), Some("/1/2"));
        let mut below = node(4, Some(2), Some("/1/2/4"));
        let mut lookalike = node(20, Some(1), Some("/1/20"));

        assert!(rewrite.apply(&mut moved, '/'));
        assert!(rewrite.apply(&mut below, '/'));
        assert!(!rewrite.apply(&mut lookalike, '/'));

        assert_eq!(moved.path, Some(path("/1/3/2")));
        assert_eq!(below.path, Some(path("/1/3/2/4")));
        assert_eq!(lookalike.path, Some(path("/1/20")));
    }

    #[test]
    fn test_prefix_rewrite_explicit() {
        let rewrite = PrefixRewrite::new(path("/1/2"), path("/1/3/2"))
            .with_explicit(path("/home/docs"), path("/home/blog/docs"));

        let mut below = node(4, Some(2), Some("/1/2/4"));
        below.explicit_path = Some(path("/home/docs/intro"));

        assert!(rewrite.apply(&mut below, '/'));
        assert_eq!(below.explicit_path, Some(path("/home/blog/docs/intro")));
    }

    #[test]
    fn test_field_update_apply() {
        let mut n = node(2, Some(1), Some("/1/2"));
        FieldUpdate::Parent(None).apply(&mut n);
        FieldUpdate::Path(None).apply(&mut n);
        assert!(n.parent_id.is_none());
        assert!(n.path.is_none());
    }
}
