//! Tree engine facade.

use std::sync::Arc;

use matpath::{Node, TreeConfig};

use crate::bulk;
use crate::cache::PlanCache;
use crate::computer::PathComputer;
use crate::config::EngineConfig;
use crate::error::TreeResult;
use crate::guard::CycleGuard;
use crate::predicates;
use crate::query::TreeQueryEngine;
use crate::result::{BatchResult, BulkReport, UpdateReport};
use crate::traits::{in_transaction, PathStore};

/// Main entry point for path maintenance and tree queries.
///
/// The engine bridges the tree model (`matpath`) and any store implementing
/// [`PathStore`]. Every mutation runs inside one store transaction when
/// [`EngineConfig::transactional`] is set: it commits on success and rolls
/// back on any error.
///
/// # Example
///
/// ```rust
/// use matpath::{Node, NodeId, TreeConfig};
/// use matpath_engine::{PathStore, TreeEngine};
/// use matpath_memory::MemoryStore;
///
/// let store = MemoryStore::new();
/// for node in [
///     Node::root(1u64),
///     Node::child_of(2u64, 1u64),
///     Node::child_of(3u64, 1u64),
///     Node::child_of(4u64, 2u64),
/// ] {
///     store.insert(node);
/// }
///
/// let tree = TreeConfig::default();
/// let engine = TreeEngine::new(&store);
/// engine.compute_all_path(&tree).unwrap();
///
/// // Move 2 (and 4 with it) under 3.
/// let get = |id: u64| store.get(&tree, &NodeId::from(id)).unwrap().unwrap();
/// let mut two = get(2);
/// engine.set_as_child_of(&tree, &mut two, Some(&get(3))).unwrap();
///
/// assert_eq!(get(4).path.unwrap().as_str(), "/1/3/2/4");
/// ```
pub struct TreeEngine<'a> {
    /// Reference to the store.
    store: &'a dyn PathStore,
    /// Engine configuration.
    config: EngineConfig,
    /// Batch plan cache (optional).
    plan_cache: Option<Arc<PlanCache>>,
}

impl<'a> TreeEngine<'a> {
    /// Creates an engine with default configuration.
    pub fn new(store: &'a dyn PathStore) -> Self {
        Self {
            store,
            config: EngineConfig::default(),
            plan_cache: None,
        }
    }

    /// Creates an engine with custom configuration.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = EngineConfig::builder()
    ///     .with_plan_cache(PlanCacheConfig::default())
    ///     .with_max_depth(64)
    ///     .build();
    ///
    /// let engine = TreeEngine::with_config(&store, config);
    /// ```
    pub fn with_config(store: &'a dyn PathStore, config: EngineConfig) -> Self {
        let plan_cache = config
            .plan_cache
            .as_ref()
            .map(|c| Arc::new(PlanCache::new(c.clone())));
        Self {
            store,
            config,
            plan_cache,
        }
    }

    /// Returns a reference to the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns a reference to the plan cache if enabled.
    pub fn plan_cache(&self) -> Option<&PlanCache> {
        self.plan_cache.as_deref()
    }

    /// Recomputes the path (and explicit path when configured) of `node`
    /// and its subtree.
    pub fn refresh_path(&self, tree: &TreeConfig, node: &mut Node) -> TreeResult<UpdateReport> {
        self.transactional(|| self.computer().refresh_path(tree, node))
    }

    /// Recomputes the path of `node` and its subtree.
    pub fn update_path(&self, tree: &TreeConfig, node: &mut Node) -> TreeResult<UpdateReport> {
        self.transactional(|| self.computer().update_path(tree, node))
    }

    /// Recomputes path and explicit path of `node` and its subtree.
    pub fn update_path_and_explicit_path(
        &self,
        tree: &TreeConfig,
        node: &mut Node,
    ) -> TreeResult<UpdateReport> {
        self.transactional(|| self.computer().update_path_and_explicit_path(tree, node))
    }

    /// Recomputes every path of the node type from scratch.
    pub fn compute_all_path(&self, tree: &TreeConfig) -> TreeResult<BulkReport> {
        self.transactional(|| bulk::compute_all_path(self.store, tree, self.config.max_depth))
    }

    /// Moves `node` under `parent` (`None` makes it a root).
    pub fn set_as_child_of(
        &self,
        tree: &TreeConfig,
        node: &mut Node,
        parent: Option<&Node>,
    ) -> TreeResult<UpdateReport> {
        self.transactional(|| self.guard().set_as_child_of(tree, node, parent))
    }

    /// Moves `child` under `node`.
    pub fn set_as_parent_of(
        &self,
        tree: &TreeConfig,
        node: &Node,
        child: &mut Node,
    ) -> TreeResult<UpdateReport> {
        self.transactional(|| self.guard().set_as_parent_of(tree, node, child))
    }

    /// Detaches `node` from its parent.
    pub fn set_as_root(&self, tree: &TreeConfig, node: &mut Node) -> TreeResult<UpdateReport> {
        self.transactional(|| self.guard().set_as_root(tree, node))
    }

    /// Fetches the descendants of every requester with one store query.
    pub fn fetch_descendants_batch(
        &self,
        tree: &TreeConfig,
        requesters: &[Node],
    ) -> TreeResult<BatchResult> {
        self.query().fetch_descendants_batch(tree, requesters)
    }

    /// Fetches the ancestors of every requester with one store query.
    pub fn fetch_ancestors_batch(
        &self,
        tree: &TreeConfig,
        requesters: &[Node],
    ) -> TreeResult<BatchResult> {
        self.query().fetch_ancestors_batch(tree, requesters)
    }

    /// Descendants of one node, sorted by path.
    pub fn descendants_of(&self, tree: &TreeConfig, node: &Node) -> TreeResult<Vec<Node>> {
        self.query().descendants_of(tree, node)
    }

    /// Ancestors of one node, root first.
    pub fn ancestors_of(&self, tree: &TreeConfig, node: &Node) -> TreeResult<Vec<Node>> {
        self.query().ancestors_of(tree, node)
    }

    /// Returns true if no row has `node` as its parent.
    pub fn is_leaf(&self, tree: &TreeConfig, node: &Node) -> TreeResult<bool> {
        predicates::is_leaf(self.store, tree, node)
    }

    fn computer(&self) -> PathComputer<'a> {
        PathComputer::new(self.store, self.config.max_depth)
    }

    fn guard(&self) -> CycleGuard<'a> {
        CycleGuard::new(self.store, self.config.max_depth)
    }

    fn query(&self) -> TreeQueryEngine<'_> {
        let engine = TreeQueryEngine::new(self.store).with_parallel(self.config.parallel);
        match self.plan_cache() {
            Some(cache) => engine.with_cache(cache),
            None => engine,
        }
    }

    fn transactional<T>(&self, work: impl FnOnce() -> TreeResult<T>) -> TreeResult<T> {
        in_transaction(self.store, self.config.transactional, work)
    }
}
