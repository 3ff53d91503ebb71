//! Configuration types for the tree engine.

/// Default bound on hierarchy depth for fixpoint propagation and chain walks.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Configuration for the tree engine.
///
/// Per node type settings (columns, separator) live in
/// [`matpath::TreeConfig`]; this struct only tunes engine behavior.
///
/// # Example
///
/// ```rust
/// use matpath_engine::{EngineConfig, PlanCacheConfig};
///
/// let config = EngineConfig::builder()
///     .with_max_depth(64)
///     .with_plan_cache(PlanCacheConfig::default())
///     .with_parallel(true)
///     .build();
///
/// assert_eq!(config.max_depth, 64);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum tree depth; bulk computation failing to converge within it
    /// is reported as a cycle.
    pub max_depth: usize,
    /// Wrap every top-level mutation in a store transaction.
    pub transactional: bool,
    /// Partition batch results in parallel (requires `parallel` feature).
    pub parallel: bool,
    /// Plan cache configuration (None = caching disabled).
    pub plan_cache: Option<PlanCacheConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            transactional: true,
            parallel: false,
            plan_cache: None,
        }
    }
}

impl EngineConfig {
    /// Creates a new builder for EngineConfig.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

/// Builder for EngineConfig.
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    max_depth: Option<usize>,
    transactional: Option<bool>,
    parallel: bool,
    plan_cache: Option<PlanCacheConfig>,
}

impl EngineConfigBuilder {
    /// Sets the depth bound.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Enables or disables transaction scoping.
    pub fn with_transactions(mut self, transactional: bool) -> Self {
        self.transactional = Some(transactional);
        self
    }

    /// Enables or disables parallel result partitioning.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enables plan caching with the given configuration.
    pub fn with_plan_cache(mut self, plan_cache: PlanCacheConfig) -> Self {
        self.plan_cache = Some(plan_cache);
        self
    }

    /// Builds the EngineConfig.
    pub fn build(self) -> EngineConfig {
        EngineConfig {
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
            transactional: self.transactional.unwrap_or(true),
            parallel: self.parallel,
            plan_cache: self.plan_cache,
        }
    }
}

/// Configuration for the batch plan cache.
#[derive(Debug, Clone)]
pub struct PlanCacheConfig {
    /// Maximum number of cached plans.
    pub max_entries: usize,
}

impl Default for PlanCacheConfig {
    fn default() -> Self {
        Self { max_entries: 1_000 }
    }
}
