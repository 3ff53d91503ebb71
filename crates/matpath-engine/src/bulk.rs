//! Full-table path computation.
//!
//! Every path is cleared, roots are assigned `separator || id`, then one
//! join pass per tree level copies the parent's path into its children until
//! no row is left without a path. A cycle or an orphan never resolves, so the
//! loop is bounded by the maximum depth and fails on a pass that makes no
//! progress.

use matpath::TreeConfig;
use tracing::{debug, info, warn};

use crate::error::{TreeError, TreeResult};
use crate::filter::{FieldUpdate, RowFilter};
use crate::result::BulkReport;
use crate::traits::PathStore;

/// Recomputes the path of every row of one node type.
///
/// Fails with [`TreeError::CircularTreeRelation`] carrying the smallest
/// unresolved key when the hierarchy contains a cycle, an orphan, or is
/// deeper than `max_depth` levels.
///
/// # Example
///
/// ```rust
/// use matpath::{Node, TreeConfig};
/// use matpath_engine::compute_all_path;
/// use matpath_memory::MemoryStore;
///
/// let store = MemoryStore::new();
/// store.insert(Node::root(1u64));
/// store.insert(Node::child_of(2u64, 1u64));
/// store.insert(Node::child_of(4u64, 2u64));
///
/// let report = compute_all_path(&store, &TreeConfig::default(), 32).unwrap();
/// assert_eq!(report.iterations, 2);
/// assert_eq!(report.affected_rows, 3);
/// ```
pub fn compute_all_path(
    store: &dyn PathStore,
    tree: &TreeConfig,
    max_depth: usize,
) -> TreeResult<BulkReport> {
    let mut clear = vec![FieldUpdate::Path(None)];
    if tree.has_explicit_path() {
        clear.push(FieldUpdate::ExplicitPath(None));
    }
    store.update_where(tree, &RowFilter::All, &clear)?;

    let mut report = BulkReport {
        affected_rows: store.assign_root_paths(tree)?,
        iterations: 0,
    };
    debug!(node_type = %tree.node_type, roots = report.affected_rows, "assigned root paths");

    while store.exists_where(tree, &RowFilter::PathIsNull)? {
        report.iterations += 1;
        if report.iterations > max_depth {
            return Err(unresolved(store, tree)?);
        }

        let resolved = store.resolve_next_level(tree)?;
        if tree.has_explicit_path() {
            store.resolve_next_explicit_level(tree)?;
        }
        debug!(
            node_type = %tree.node_type,
            iteration = report.iterations,
            resolved,
            "resolved tree level"
        );

        if resolved == 0 {
            let err = unresolved(store, tree)?;
            warn!(node_type = %tree.node_type, error = %err, "path computation stalled");
            return Err(err);
        }
        report.affected_rows += resolved;
    }

    info!(
        node_type = %tree.node_type,
        affected_rows = report.affected_rows,
        iterations = report.iterations,
        "computed all paths"
    );
    Ok(report)
}

/// Builds the cycle error for the smallest key still without a path.
fn unresolved(store: &dyn PathStore, tree: &TreeConfig) -> TreeResult<TreeError> {
    let node_id = store
        .fetch_where(tree, &RowFilter::PathIsNull)?
        .into_iter()
        .map(|n| n.id)
        .min();
    Ok(TreeError::circular(tree.node_type.clone(), node_id))
}
