//! Discovery core: ties one strategy to one store and drives the
//! candidate-to-rule pipeline as a lazy stream.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use depmine_core::errors::DiscoveryError;
use depmine_core::events::types::CandidateProgressEvent;
use depmine_core::events::EventDispatcher;
use depmine_core::traits::{Cancellable, CancellationToken, RelationalStore};
use depmine_core::types::kind::DependencyKind;

use crate::candidate::CandidateRule;
use crate::compat::Oracle;
use crate::identity::{AttributeMapper, JoinablePair};
use crate::rules::Rule;
use crate::stats::DiscoveryStats;
use crate::strategy::{RuleStrategy, SearchSpace};
use crate::traversal::{
    budget_admit, AStarTraversal, BfsTraversal, DfsTraversal, PathLengthHeuristic, SearchBudgets,
    TraversalAlgorithm, TraversalGuide,
};

/// Lifecycle of a [`RuleDiscoveryCore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreState {
    Uninitialized,
    Initialized,
    Discovering,
    Cleaned,
}

/// Per-run knobs passed to [`RuleDiscoveryCore::discover`].
#[derive(Clone)]
pub struct DiscoverOptions {
    /// Restrict the search to one start node; `None` searches from every
    /// node of the space.
    pub start: Option<JoinablePair>,
    pub budgets: SearchBudgets,
    pub algorithm: TraversalAlgorithm,
    /// Low-quality floor below which splits are rejected.
    pub floor: f64,
    /// Emit a progress event every this many candidates; 0 disables.
    pub snapshot_interval: u64,
    pub dispatcher: Arc<EventDispatcher>,
    /// Checked between candidates; a cancelled token ends the stream.
    pub cancel: Option<CancellationToken>,
}

/// Bridges a strategy's feasibility check and the shared budget admission
/// into the traversal guide contract.
struct StrategyGuide {
    strategy: Arc<dyn RuleStrategy>,
    store: Arc<dyn RelationalStore>,
    mapper: Arc<AttributeMapper>,
}

impl TraversalGuide for StrategyGuide {
    fn feasible(&self, path: &CandidateRule) -> bool {
        self.strategy
            .path_feasible(self.store.as_ref(), &self.mapper, path)
    }

    fn admit(&self, path: &CandidateRule, next: JoinablePair, budgets: &SearchBudgets) -> bool {
        budget_admit(&self.mapper, path, next, budgets)
    }
}

/// One strategy bound to one store, stepping through init, discovery, and
/// cleanup.
pub struct RuleDiscoveryCore {
    store: Arc<dyn RelationalStore>,
    strategy: Arc<dyn RuleStrategy>,
    state: CoreState,
    space: Option<SearchSpace>,
}

impl RuleDiscoveryCore {
    pub fn new(store: Arc<dyn RelationalStore>, strategy: Arc<dyn RuleStrategy>) -> Self {
        Self {
            store,
            strategy,
            state: CoreState::Uninitialized,
            space: None,
        }
    }

    pub fn kind(&self) -> DependencyKind {
        self.strategy.kind()
    }

    pub fn state(&self) -> CoreState {
        self.state
    }

    pub fn search_space(&self) -> Option<&SearchSpace> {
        self.space.as_ref()
    }

    /// Builds the search space. May be called again to rebuild against a
    /// changed store.
    pub fn init(
        &mut self,
        oracle: &Oracle,
        max_occurrence: u32,
        request_indexes: bool,
    ) -> Result<(), DiscoveryError> {
        let space =
            self.strategy
                .init(self.store.as_ref(), oracle, max_occurrence, request_indexes)?;
        debug!(
            kind = self.strategy.kind().as_str(),
            nodes = space.graph.node_count(),
            edges = space.graph.edge_count(),
            "search space built"
        );
        self.space = Some(space);
        self.state = CoreState::Initialized;
        Ok(())
    }

    /// Starts a discovery run. The returned stream owns shared handles to
    /// the space, so it stays valid after `cleanup` or drop of the core.
    pub fn discover(&mut self, options: DiscoverOptions) -> Result<RuleStream, DiscoveryError> {
        let space = self.space.as_ref().ok_or(DiscoveryError::NotInitialized)?;
        self.state = CoreState::Discovering;

        let graph = Arc::clone(&space.graph);
        let mapper = Arc::clone(&space.mapper);
        let guide = StrategyGuide {
            strategy: Arc::clone(&self.strategy),
            store: Arc::clone(&self.store),
            mapper: Arc::clone(&mapper),
        };
        let candidates: Box<dyn Iterator<Item = CandidateRule>> = match options.algorithm {
            TraversalAlgorithm::Dfs => Box::new(DfsTraversal::new(
                graph,
                guide,
                options.budgets,
                options.start,
            )),
            TraversalAlgorithm::Bfs => Box::new(BfsTraversal::new(
                graph,
                guide,
                options.budgets,
                options.start,
            )),
            TraversalAlgorithm::AStar => Box::new(AStarTraversal::new(
                graph,
                guide,
                PathLengthHeuristic,
                options.budgets,
                options.start,
            )),
        };

        Ok(RuleStream {
            candidates,
            strategy: Arc::clone(&self.strategy),
            store: Arc::clone(&self.store),
            mapper,
            floor: options.floor,
            snapshot_interval: options.snapshot_interval,
            dispatcher: options.dispatcher,
            cancel: options.cancel,
            kind: self.strategy.kind(),
            stats: DiscoveryStats::default(),
            pending: VecDeque::new(),
        })
    }

    /// Releases the search space. Discovery requires another `init`.
    pub fn cleanup(&mut self) {
        self.space = None;
        self.state = CoreState::Cleaned;
    }
}

/// Lazy stream of accepted rules.
///
/// Pulls candidates from the traversal, scores each split, and buffers the
/// rules of one candidate so callers see them one at a time. Counters and
/// progress events are updated as candidates are consumed.
pub struct RuleStream {
    candidates: Box<dyn Iterator<Item = CandidateRule>>,
    strategy: Arc<dyn RuleStrategy>,
    store: Arc<dyn RelationalStore>,
    mapper: Arc<AttributeMapper>,
    floor: f64,
    snapshot_interval: u64,
    dispatcher: Arc<EventDispatcher>,
    cancel: Option<CancellationToken>,
    kind: DependencyKind,
    stats: DiscoveryStats,
    pending: VecDeque<Rule>,
}

impl RuleStream {
    pub fn stats(&self) -> &DiscoveryStats {
        &self.stats
    }
}

impl Iterator for RuleStream {
    type Item = Rule;

    fn next(&mut self) -> Option<Rule> {
        loop {
            if let Some(rule) = self.pending.pop_front() {
                return Some(rule);
            }
            if self.cancel.as_ref().is_some_and(|token| token.is_cancelled()) {
                return None;
            }
            let candidate = self.candidates.next()?;
            self.stats.candidates += 1;
            if self.snapshot_interval > 0 && self.stats.candidates % self.snapshot_interval == 0 {
                debug!(
                    kind = self.kind.as_str(),
                    candidates = self.stats.candidates,
                    rules = self.stats.rules_emitted,
                    "discovery progress"
                );
                self.dispatcher
                    .emit_candidate_progress(&CandidateProgressEvent {
                        kind: self.kind.as_str().to_owned(),
                        candidates_seen: self.stats.candidates,
                        rules_emitted: self.stats.rules_emitted,
                    });
            }
            for split in self.strategy.split_candidate(&self.mapper, &candidate) {
                self.stats.splits_scored += 1;
                let scored = self.strategy.score_split(
                    self.store.as_ref(),
                    &self.mapper,
                    &candidate,
                    &split,
                    self.floor,
                );
                if let Some((support, confidence)) = scored {
                    if let Some(rule) = self.strategy.instantiate(
                        &self.mapper,
                        &candidate,
                        &split,
                        support,
                        confidence,
                    ) {
                        self.stats.splits_accepted += 1;
                        self.stats.record_rule(support, confidence);
                        self.pending.push_back(rule);
                    }
                }
            }
        }
    }
}
