//! Covering-set reduction for batched subtree and ancestor-chain fetches.
//!
//! Resolving "descendants of" for N nodes at once would naively send N
//! `LIKE` branches to the store. Many of them are redundant: the
//! descendants of `/1/2/4` are already among the descendants of `/1/2`. The
//! planner keeps only the paths whose filters are not subsumed by another
//! kept path.
//!
//! | Direction | Order | Keep a path when | Branch |
//! |-----------|-------|------------------|--------|
//! | Descendants | ascending | no kept path is its ancestor | `path LIKE kept/%` |
//! | Ancestors | descending | it is no kept path's ancestor | `kept LIKE path/%` |
//!
//! Reduction is O(n²) prefix comparisons over the distinct requester paths,
//! bounded by the batch size rather than the table size.

use std::fmt;

use matpath::TreePath;

use crate::filter::RowFilter;

/// Which relation a batch resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchDirection {
    /// Every row below some requester.
    Descendants,
    /// Every row above some requester.
    Ancestors,
}

impl fmt::Display for BatchDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchDirection::Descendants => write!(f, "descendants"),
            BatchDirection::Ancestors => write!(f, "ancestors"),
        }
    }
}

/// A reduced set of prefix filters for one batch.
///
/// # Example
///
/// ```rust
/// use matpath::TreePath;
/// use matpath_engine::{BatchDirection, BatchPlan};
///
/// let paths = vec![
///     TreePath::parse("/1/2", '/').unwrap(),
///     TreePath::parse("/1/2/4", '/').unwrap(),
/// ];
/// let plan = BatchPlan::build(BatchDirection::Descendants, &paths, '/');
///
/// assert_eq!(plan.kept.len(), 1);
/// assert_eq!(plan.kept[0].as_str(), "/1/2");
/// assert_eq!(plan.branch_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    /// Relation being resolved.
    pub direction: BatchDirection,
    /// Number of distinct requester paths before reduction.
    pub requested: usize,
    /// Paths that survived reduction.
    pub kept: Vec<TreePath>,
    /// Filter to send to the store (OR of one branch per kept path).
    pub filter: RowFilter,
}

impl BatchPlan {
    /// Creates a plan that fetches nothing.
    pub fn empty(direction: BatchDirection) -> Self {
        Self {
            direction,
            requested: 0,
            kept: Vec::new(),
            filter: RowFilter::Or(Vec::new()),
        }
    }

    /// Reduces the requester paths and builds the filter.
    pub fn build(direction: BatchDirection, paths: &[TreePath], separator: char) -> Self {
        let requested = distinct_sorted(paths).len();
        let kept = match direction {
            BatchDirection::Descendants => reduce_for_descendants(paths, separator),
            BatchDirection::Ancestors => reduce_for_ancestors(paths, separator),
        };
        let branches = kept
            .iter()
            .map(|path| match direction {
                BatchDirection::Descendants => {
                    RowFilter::PathStartsWith(path.descendant_prefix(separator))
                }
                BatchDirection::Ancestors => RowFilter::PathIsAncestorOf(path.clone()),
            })
            .collect();

        Self {
            direction,
            requested,
            kept,
            filter: RowFilter::Or(branches),
        }
    }

    /// Number of OR branches in the filter.
    pub fn branch_count(&self) -> usize {
        self.kept.len()
    }

    /// Returns true if the plan has no branch (nothing to fetch).
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

impl fmt::Display for BatchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch plan for {}", self.direction)?;
        writeln!(
            f,
            "Reduced {} paths to {} branches",
            self.requested,
            self.kept.len()
        )?;
        write!(f, "Filter: {}", self.filter)
    }
}

/// Keeps the shortest, non-overlapping paths.
///
/// ```rust
/// use matpath::TreePath;
/// use matpath_engine::reduce_for_descendants;
///
/// let p = |s| TreePath::parse(s, '/').unwrap();
/// let kept = reduce_for_descendants(&[p("/1/2/4"), p("/1/2"), p("/1/20")], '/');
/// assert_eq!(kept, vec![p("/1/2"), p("/1/20")]);
/// ```
pub fn reduce_for_descendants(paths: &[TreePath], separator: char) -> Vec<TreePath> {
    let mut kept: Vec<TreePath> = Vec::new();
    for path in distinct_sorted(paths) {
        let covered = kept.iter().any(|k| k.is_ancestor_of(path, separator));
        if !covered {
            kept.push(path.clone());
        }
    }
    kept
}

/// Keeps the longest paths; a path that is an ancestor of a kept path adds
/// nothing, since its ancestors are a subset of the kept path's ancestors.
pub fn reduce_for_ancestors(paths: &[TreePath], separator: char) -> Vec<TreePath> {
    let mut kept: Vec<TreePath> = Vec::new();
    for path in distinct_sorted(paths).into_iter().rev() {
        let covered = kept.iter().any(|k| path.is_ancestor_of(k, separator));
        if !covered {
            kept.push(path.clone());
        }
    }
    kept
}

fn distinct_sorted(paths: &[TreePath]) -> Vec<&TreePath> {
    let mut sorted: Vec<&TreePath> = paths.iter().collect();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> TreePath {
        TreePath::parse(s, '/').unwrap()
    }

    #[test]
    fn test_descendants_covered_path_dropped() {
        let kept = reduce_for_descendants(&[p("/1/2"), p("/1/2/4")], '/');
        assert_eq!(kept, vec![p("/1/2")]);
    }

    #[test]
    fn test_descendants_numeric_lookalike_kept() {
        let kept = reduce_for_descendants(&[p("/1/2"), p("/1/20"), p("/1/20/5")], '/');
        assert_eq!(kept, vec![p("/1/2"), p("/1/20")]);
    }

    #[test]
    fn test_descendants_dense_subtree_collapses() {
        let paths = vec![
            p("/1/3/6"),
            p("/1"),
            p("/1/2"),
            p("/1/2/4"),
            p("/1/2/5"),
            p("/1/3"),
        ];
        assert_eq!(reduce_for_descendants(&paths, '/'), vec![p("/1")]);
    }

    #[test]
    fn test_descendants_duplicates_removed() {
        let kept = reduce_for_descendants(&[p("/7"), p("/7"), p("/8")], '/');
        assert_eq!(kept, vec![p("/7"), p("/8")]);
    }

    #[test]
    fn test_ancestors_keep_longest() {
        let kept = reduce_for_ancestors(&[p("/1/2"), p("/1/2/4"), p("/1/3")], '/');
        assert_eq!(kept, vec![p("/1/3"), p("/1/2/4")]);
    }

    #[test]
    fn test_ancestors_lookalike_not_covered() {
        let kept = reduce_for_ancestors(&[p("/1/2"), p("/1/20/7")], '/');
        assert_eq!(kept, vec![p("/1/20/7"), p("/1/2")]);
    }

    #[test]
    fn test_plan_descendant_filter() {
        let plan = BatchPlan::build(
            BatchDirection::Descendants,
            &[p("/1/2"), p("/1/2/4")],
            '/',
        );
        assert_eq!(plan.requested, 2);
        assert_eq!(plan.branch_count(), 1);
        assert_eq!(
            plan.filter,
            RowFilter::Or(vec![RowFilter::PathStartsWith("/1/2/".to_string())])
        );
    }

    #[test]
    fn test_plan_ancestor_filter() {
        let plan = BatchPlan::build(BatchDirection::Ancestors, &[p("/1/2"), p("/1/2/4")], '/');
        assert_eq!(
            plan.filter,
            RowFilter::Or(vec![RowFilter::PathIsAncestorOf(p("/1/2/4"))])
        );
    }

    #[test]
    fn test_plan_empty() {
        let plan = BatchPlan::build(BatchDirection::Descendants, &[], '/');
        assert!(plan.is_empty());
        assert_eq!(plan, BatchPlan::empty(BatchDirection::Descendants));
    }

    #[test]
    fn test_plan_display() {
        let plan = BatchPlan::build(BatchDirection::Descendants, &[p("/1/2"), p("/1/2/4")], '/');
        let text = plan.to_string();
        assert!(text.contains("Batch plan for descendants"));
        assert!(text.contains("Reduced 2 paths to 1 branches"));
        assert!(text.contains("path LIKE '/1/2/%'"));
    }
}
