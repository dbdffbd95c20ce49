//! Capability registry: kind and algorithm resolution.

use std::sync::Arc;

use tracing::warn;

use depmine_core::errors::ConfigError;
use depmine_core::types::collections::FxHashMap;
use depmine_core::types::kind::DependencyKind;

use crate::strategy::{EgdStrategy, FdStrategy, HornStrategy, RuleStrategy, TgdStrategy};
use crate::traversal::TraversalAlgorithm;

/// Maps dependency kinds to their strategies. Resolved once at session
/// start so that a misconfigured kind fails before any query runs.
pub struct CapabilityRegistry {
    strategies: FxHashMap<DependencyKind, Arc<dyn RuleStrategy>>,
}

impl CapabilityRegistry {
    /// Registry with all built-in strategies.
    pub fn with_defaults() -> Self {
        let mut strategies: FxHashMap<DependencyKind, Arc<dyn RuleStrategy>> =
            FxHashMap::default();
        strategies.insert(DependencyKind::Fd, Arc::new(FdStrategy));
        strategies.insert(DependencyKind::Egd, Arc::new(EgdStrategy));
        strategies.insert(DependencyKind::Tgd, Arc::new(TgdStrategy));
        strategies.insert(DependencyKind::Horn, Arc::new(HornStrategy));
        Self { strategies }
    }

    pub fn register(&mut self, strategy: Arc<dyn RuleStrategy>) {
        self.strategies.insert(strategy.kind(), strategy);
    }

    pub fn strategy(&self, kind: DependencyKind) -> Option<Arc<dyn RuleStrategy>> {
        self.strategies.get(&kind).cloned()
    }

    /// Parses kind names, failing fast on the first unknown name.
    pub fn kinds_from_names(names: &[&str]) -> Result<Vec<DependencyKind>, ConfigError> {
        names.iter().map(|name| DependencyKind::from_name(name)).collect()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Resolves an algorithm name; unknown names warn and fall back to DFS.
pub fn resolve_algorithm(name: &str) -> TraversalAlgorithm {
    TraversalAlgorithm::from_name(name).unwrap_or_else(|| {
        warn!(algorithm = name, "unknown traversal algorithm, falling back to dfs");
        TraversalAlgorithm::Dfs
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_kinds_registered_by_default() {
        let registry = CapabilityRegistry::with_defaults();
        for kind in DependencyKind::all() {
            let strategy = registry.strategy(kind).unwrap();
            assert_eq!(strategy.kind(), kind);
        }
    }

    #[test]
    fn unknown_kind_name_is_fatal() {
        assert!(CapabilityRegistry::kinds_from_names(&["fd", "mvd"]).is_err());
    }

    #[test]
    fn unknown_algorithm_falls_back_to_dfs() {
        assert_eq!(resolve_algorithm("dijkstra"), TraversalAlgorithm::Dfs);
        assert_eq!(resolve_algorithm("bfs"), TraversalAlgorithm::Bfs);
    }
}
