//! Batched subtree and ancestor-chain queries.
//!
//! A batch is answered with one store query: the requester paths are reduced
//! to a covering set (see [`BatchPlan`]), the OR of their prefix filters
//! is sent to the store, and the candidate rows are re-partitioned per
//! requester with the exact pairwise predicate.

use std::collections::HashMap;
use std::time::Instant;

use matpath::{Node, NodeId, TreeConfig, TreePath};
use tracing::{debug, warn};

use crate::cache::{PlanCache, PlanKey};
use crate::error::TreeResult;
use crate::planner::{BatchDirection, BatchPlan};
use crate::result::{BatchResult, BatchStats};
use crate::traits::PathStore;

/// Answers descendant and ancestor queries for many nodes at once.
///
/// # Example
///
/// ```rust
/// use matpath::{Node, NodeId, TreeConfig};
/// use matpath_engine::{compute_all_path, PathStore, TreeQueryEngine};
/// use matpath_memory::MemoryStore;
///
/// let store = MemoryStore::new();
/// store.insert(Node::root(1u64));
/// store.insert(Node::child_of(2u64, 1u64));
/// store.insert(Node::child_of(4u64, 2u64));
/// let tree = TreeConfig::default();
/// compute_all_path(&store, &tree, 32).unwrap();
///
/// let two = store.get(&tree, &NodeId::from(2u64)).unwrap().unwrap();
/// let four = store.get(&tree, &NodeId::from(4u64)).unwrap().unwrap();
///
/// let engine = TreeQueryEngine::new(&store);
/// let result = engine.fetch_descendants_batch(&tree, &[two, four]).unwrap();
///
/// assert_eq!(result.plan.branch_count(), 1);
/// assert_eq!(result.ids(&NodeId::from(2u64)), vec![NodeId::from(4u64)]);
/// assert!(result.get(&NodeId::from(4u64)).is_empty());
/// ```
pub struct TreeQueryEngine<'a> {
    store: &'a dyn PathStore,
    cache: Option<&'a PlanCache>,
    parallel: bool,
}

impl<'a> TreeQueryEngine<'a> {
    /// Creates an engine without plan caching.
    pub fn new(store: &'a dyn PathStore) -> Self {
        Self {
            store,
            cache: None,
            parallel: false,
        }
    }

    /// Reuses reduced plans from `cache`.
    pub fn with_cache(mut self, cache: &'a PlanCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Partitions candidates on the rayon pool (requires `parallel` feature).
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Fetches every descendant of every requester with one store query.
    pub fn fetch_descendants_batch(
        &self,
        tree: &TreeConfig,
        requesters: &[Node],
    ) -> TreeResult<BatchResult> {
        self.fetch_batch(tree, requesters, BatchDirection::Descendants)
    }

    /// Fetches every ancestor of every requester with one store query.
    pub fn fetch_ancestors_batch(
        &self,
        tree: &TreeConfig,
        requesters: &[Node],
    ) -> TreeResult<BatchResult> {
        self.fetch_batch(tree, requesters, BatchDirection::Ancestors)
    }

    /// Descendants of one node, sorted by path.
    pub fn descendants_of(&self, tree: &TreeConfig, node: &Node) -> TreeResult<Vec<Node>> {
        let mut result = self.fetch_descendants_batch(tree, std::slice::from_ref(node))?;
        Ok(result.by_requester.remove(&node.id).unwrap_or_default())
    }

    /// Ancestors of one node, root first.
    pub fn ancestors_of(&self, tree: &TreeConfig, node: &Node) -> TreeResult<Vec<Node>> {
        let mut result = self.fetch_ancestors_batch(tree, std::slice::from_ref(node))?;
        Ok(result.by_requester.remove(&node.id).unwrap_or_default())
    }

    fn fetch_batch(
        &self,
        tree: &TreeConfig,
        requesters: &[Node],
        direction: BatchDirection,
    ) -> TreeResult<BatchResult> {
        let start = Instant::now();
        let separator = tree.separator;

        let mut by_requester: HashMap<NodeId, Vec<Node>> = requesters
            .iter()
            .map(|n| (n.id.clone(), Vec::new()))
            .collect();
        let mut pathed: Vec<(NodeId, TreePath)> = Vec::with_capacity(requesters.len());
        for node in requesters {
            match &node.path {
                Some(path) => pathed.push((node.id.clone(), path.clone())),
                None => warn!(
                    node_type = %tree.node_type,
                    node_id = %node.id,
                    %direction,
                    "requester has no computed path"
                ),
            }
        }

        let paths: Vec<TreePath> = pathed.iter().map(|(_, p)| p.clone()).collect();
        let (plan, plan_cache_hit) = match self.cache {
            Some(cache) => cache.get_or_build(PlanKey::new(direction, &paths, separator), || {
                BatchPlan::build(direction, &paths, separator)
            }),
            None => (BatchPlan::build(direction, &paths, separator), false),
        };

        let mut stats = BatchStats {
            filter_branches: plan.branch_count(),
            plan_cache_hit,
            ..Default::default()
        };

        if !plan.is_empty() {
            let candidates = self.store.fetch_where(tree, &plan.filter)?;
            stats.candidates = candidates.len();
            if !candidates.is_empty() {
                by_requester.extend(self.partition(direction, &pathed, &candidates, separator));
            }
        }

        stats.duration = start.elapsed();
        debug!(
            node_type = %tree.node_type,
            %direction,
            requesters = requesters.len(),
            branches = stats.filter_branches,
            candidates = stats.candidates,
            cache_hit = stats.plan_cache_hit,
            "batch fetch complete"
        );

        Ok(BatchResult {
            by_requester,
            plan,
            stats,
        })
    }

    fn partition(
        &self,
        direction: BatchDirection,
        requesters: &[(NodeId, TreePath)],
        candidates: &[Node],
        separator: char,
    ) -> Vec<(NodeId, Vec<Node>)> {
        #[cfg(feature = "parallel")]
        if self.parallel {
            return partition_parallel(direction, requesters, candidates, separator);
        }
        #[cfg(not(feature = "parallel"))]
        let _ = self.parallel;

        requesters
            .iter()
            .map(|(id, path)| (id.clone(), matching(direction, path, candidates, separator)))
            .collect()
    }
}

#[cfg(feature = "parallel")]
fn partition_parallel(
    direction: BatchDirection,
    requesters: &[(NodeId, TreePath)],
    candidates: &[Node],
    separator: char,
) -> Vec<(NodeId, Vec<Node>)> {
    use rayon::prelude::*;

    requesters
        .par_iter()
        .map(|(id, path)| (id.clone(), matching(direction, path, candidates, separator)))
        .collect()
}

/// Candidates related to `path` in `direction`, sorted by path.
fn matching(
    direction: BatchDirection,
    path: &TreePath,
    candidates: &[Node],
    separator: char,
) -> Vec<Node> {
    let mut rows: Vec<Node> = candidates
        .iter()
        .filter(|c| {
            c.path.as_ref().is_some_and(|candidate| match direction {
                BatchDirection::Descendants => path.is_ancestor_of(candidate, separator),
                BatchDirection::Ancestors => candidate.is_ancestor_of(path, separator),
            })
        })
        .cloned()
        .collect();
    rows.sort_by(|a, b| a.path.cmp(&b.path));
    rows
}
