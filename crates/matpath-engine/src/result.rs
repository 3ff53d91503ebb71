//! Result types for path maintenance and batch queries.

use std::collections::HashMap;
use std::time::Duration;

use matpath::{Node, NodeId};

use crate::planner::BatchPlan;

/// Outcome of a path update on one node and its subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Number of rows written.
    pub affected_rows: usize,
    /// Nodes whose path was (re)computed, in root-to-leaf order.
    pub visited: Vec<NodeId>,
}

impl UpdateReport {
    /// A no-op report.
    pub fn unchanged() -> Self {
        Self::default()
    }

    /// Returns true if no row was written.
    pub fn is_noop(&self) -> bool {
        self.affected_rows == 0
    }

    pub(crate) fn record(&mut self, id: &NodeId, affected: usize) {
        self.affected_rows += affected;
        self.visited.push(id.clone());
    }

    pub(crate) fn merge(&mut self, other: UpdateReport) {
        self.affected_rows += other.affected_rows;
        self.visited.extend(other.visited);
    }
}

/// Outcome of a full-table path computation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkReport {
    /// Rows written by the root pass and every propagation pass.
    pub affected_rows: usize,
    /// Number of propagation passes (one per tree level below the roots).
    pub iterations: usize,
}

/// Statistics from a batch fetch.
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    /// Total duration.
    pub duration: Duration,
    /// Number of OR branches sent to the store.
    pub filter_branches: usize,
    /// Rows returned by the store before matching.
    pub candidates: usize,
    /// Whether the plan came from the plan cache.
    pub plan_cache_hit: bool,
}

/// Result of a batch descendant or ancestor fetch.
///
/// Rows are grouped per requester and sorted by path (root to leaf).
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Matching rows per requesting node.
    pub by_requester: HashMap<NodeId, Vec<Node>>,
    /// The reduced plan that was executed.
    pub plan: BatchPlan,
    /// Execution statistics.
    pub stats: BatchStats,
}

impl BatchResult {
    /// Rows for one requester (empty if it had none).
    pub fn get(&self, id: &NodeId) -> &[Node] {
        self.by_requester.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Keys of the rows for one requester, in path order.
    pub fn ids(&self, id: &NodeId) -> Vec<NodeId> {
        self.get(id).iter().map(|n| n.id.clone()).collect()
    }

    /// Total number of (requester, row) pairs.
    pub fn total_matches(&self) -> usize {
        self.by_requester.values().map(Vec::len).sum()
    }

    /// Returns true if no requester received any row.
    pub fn is_empty(&self) -> bool {
        self.total_matches() == 0
    }
}
