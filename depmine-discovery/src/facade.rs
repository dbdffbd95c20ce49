//! Discovery session facade.
//!
//! Wires configuration, compatibility oracles, strategies, deduplication,
//! checkpointing, events, and cancellation into single-call phase runs.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{error, info};

use depmine_core::config::DiscoveryConfig;
use depmine_core::errors::{ConfigError, DiscoveryError, DiscoveryRunResult, ErrorCode, StorageError};
use depmine_core::events::{
    CheckpointWrittenEvent, DiscoveryEventHandler, ErrorEvent, EventDispatcher,
    PhaseCompleteEvent, PhaseStartedEvent, RuleDiscoveredEvent,
};
use depmine_core::traits::{Cancellable, CancellationToken, RelationalStore};
use depmine_core::types::collections::FxHashSet;
use depmine_core::types::kind::DependencyKind;

use crate::checkpoint::Checkpoint;
use crate::compat::{Oracle, OracleConfig};
use crate::core::{DiscoverOptions, RuleDiscoveryCore, RuleStream};
use crate::registry::{resolve_algorithm, CapabilityRegistry};
use crate::rules::Rule;
use crate::stats::DiscoveryStats;
use crate::traversal::SearchBudgets;

/// Outcome of one discovery phase.
#[derive(Debug)]
pub struct PhaseReport {
    pub kind: DependencyKind,
    pub rules: Vec<Rule>,
    /// Structural duplicates dropped by deduplication.
    pub duplicates: u64,
    pub stats: DiscoveryStats,
    pub cancelled: bool,
    pub duration_ms: u64,
}

/// One discovery session over one store.
///
/// Structural deduplication spans phases: a rule discovered by an earlier
/// phase (or restored from a checkpoint) is not emitted again.
pub struct DiscoverySession {
    store: Arc<dyn RelationalStore>,
    config: DiscoveryConfig,
    registry: CapabilityRegistry,
    dispatcher: Arc<EventDispatcher>,
    discovered: FxHashSet<u64>,
    total_rules: u64,
    checkpoint_loaded: bool,
}

impl DiscoverySession {
    /// Validates the configuration and sets up an empty session.
    pub fn new(
        store: Arc<dyn RelationalStore>,
        config: DiscoveryConfig,
    ) -> Result<Self, ConfigError> {
        DiscoveryConfig::validate(&config)?;
        Ok(Self {
            store,
            config,
            registry: CapabilityRegistry::with_defaults(),
            dispatcher: Arc::new(EventDispatcher::new()),
            discovered: FxHashSet::default(),
            total_rules: 0,
            checkpoint_loaded: false,
        })
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Registers an event handler. Only possible between runs; while a
    /// detached stream from [`Self::discover_stream`] is alive the
    /// dispatcher is shared and the handler is dropped with a warning.
    pub fn register_handler(&mut self, handler: Arc<dyn DiscoveryEventHandler>) {
        match Arc::get_mut(&mut self.dispatcher) {
            Some(dispatcher) => dispatcher.register(handler),
            None => tracing::warn!("dispatcher is shared by an active stream; handler not added"),
        }
    }

    /// Runs the given phases in order, collecting per-phase reports and
    /// non-fatal errors. Cancellation stops after the current phase's
    /// partial report.
    pub fn run(
        &mut self,
        kinds: &[DependencyKind],
        cancel: Option<&CancellationToken>,
    ) -> DiscoveryRunResult<Vec<PhaseReport>> {
        let mut result: DiscoveryRunResult<Vec<PhaseReport>> = DiscoveryRunResult::default();
        for &kind in kinds {
            match self.run_phase(kind, cancel) {
                Ok(report) => {
                    let cancelled = report.cancelled;
                    result.data.push(report);
                    if cancelled {
                        result.add_error(DiscoveryError::Cancelled);
                        break;
                    }
                }
                Err(err) => {
                    error!(kind = kind.as_str(), error = %err, "phase failed");
                    self.dispatcher.emit_error(&ErrorEvent {
                        code: err.error_code().to_owned(),
                        message: err.to_string(),
                    });
                    result.add_error(err);
                }
            }
        }
        result
    }

    /// Runs one phase to completion (or cancellation), draining the rule
    /// stream with deduplication and periodic checkpointing.
    pub fn run_phase(
        &mut self,
        kind: DependencyKind,
        cancel: Option<&CancellationToken>,
    ) -> Result<PhaseReport, DiscoveryError> {
        let started = Instant::now();
        self.seed_from_checkpoint();

        let mut core = self.build_core(kind)?;
        let (nodes, edges) = match core.search_space() {
            Some(space) => (space.graph.node_count(), space.graph.edge_count()),
            None => (0, 0),
        };
        self.dispatcher.emit_phase_started(&PhaseStartedEvent {
            kind: kind.as_str().to_owned(),
            node_count: nodes,
            edge_count: edges,
        });
        info!(kind = kind.as_str(), nodes, edges, "phase started");

        let mut stream = core.discover(self.discover_options(cancel))?;
        let mut rules = Vec::new();
        let mut duplicates = 0u64;
        while let Some(rule) = stream.next() {
            let hash = rule.structural_hash();
            if !self.discovered.insert(hash) && self.config.dedup_enabled {
                duplicates += 1;
                continue;
            }
            self.total_rules += 1;
            self.dispatcher.emit_rule_discovered(&RuleDiscoveredEvent {
                kind: kind.as_str().to_owned(),
                display: rule.display().to_owned(),
                support: rule.support(),
                confidence: rule.confidence(),
            });
            rules.push(rule);
            if self.config.checkpoint_interval > 0
                && self.total_rules % self.config.checkpoint_interval == 0
            {
                self.write_checkpoint(stream.stats());
            }
        }

        // The stream stops between candidates once the token flips, so the
        // token state after the drain is the phase's cancellation outcome.
        let cancelled = cancel.is_some_and(Cancellable::is_cancelled);
        let stats = stream.stats().clone();
        drop(stream);
        core.cleanup();
        self.write_checkpoint(&stats);

        let duration_ms = started.elapsed().as_millis() as u64;
        self.dispatcher.emit_phase_complete(&PhaseCompleteEvent {
            kind: kind.as_str().to_owned(),
            candidates: stats.candidates,
            rules: rules.len() as u64,
            duration_ms,
        });
        info!(
            kind = kind.as_str(),
            candidates = stats.candidates,
            rules = rules.len(),
            duplicates,
            cancelled,
            duration_ms,
            "phase complete"
        );

        Ok(PhaseReport {
            kind,
            rules,
            duplicates,
            stats,
            cancelled,
            duration_ms,
        })
    }

    /// Hands out the raw rule stream for one kind, bypassing deduplication
    /// and checkpointing. The stream owns its search space and outlives the
    /// session borrow.
    pub fn discover_stream(&self, kind: DependencyKind) -> Result<RuleStream, DiscoveryError> {
        let mut core = self.build_core(kind)?;
        core.discover(self.discover_options(None))
    }

    /// Runs independent per-kind sessions on a worker pool. Each worker gets
    /// its own store from `factory`, since store handles are generally not
    /// shareable across threads. Checkpointing is disabled per worker to
    /// avoid write races on a shared path.
    pub fn run_parallel<F>(
        factory: F,
        config: &DiscoveryConfig,
        kinds: &[DependencyKind],
    ) -> DiscoveryRunResult<Vec<PhaseReport>>
    where
        F: Fn() -> Result<Arc<dyn RelationalStore>, StorageError> + Sync,
    {
        let outcomes: Vec<Result<PhaseReport, DiscoveryError>> = kinds
            .par_iter()
            .map(|&kind| {
                let store = factory()?;
                let mut worker_config = config.clone();
                worker_config.checkpoint_path = None;
                let mut session = DiscoverySession::new(store, worker_config)?;
                session.run_phase(kind, None)
            })
            .collect();

        let mut result: DiscoveryRunResult<Vec<PhaseReport>> = DiscoveryRunResult::default();
        for outcome in outcomes {
            match outcome {
                Ok(report) => result.data.push(report),
                Err(err) => result.add_error(err),
            }
        }
        result
    }

    fn build_core(&self, kind: DependencyKind) -> Result<RuleDiscoveryCore, DiscoveryError> {
        let strategy = self
            .registry
            .strategy(kind)
            .ok_or_else(|| ConfigError::UnknownKind {
                kind: kind.as_str().to_owned(),
            })?;
        let oracle = Oracle::new(
            self.config.compatibility.mode_for(kind),
            OracleConfig::from_config(&self.config),
        );
        let mut core = RuleDiscoveryCore::new(Arc::clone(&self.store), strategy);
        core.init(&oracle, self.config.max_occurrence, self.config.request_indexes)?;
        Ok(core)
    }

    fn discover_options(&self, cancel: Option<&CancellationToken>) -> DiscoverOptions {
        DiscoverOptions {
            start: None,
            budgets: SearchBudgets {
                max_table: self.config.max_table,
                max_vars: self.config.max_vars,
            },
            algorithm: resolve_algorithm(&self.config.algorithm),
            floor: self.config.low_quality_floor,
            snapshot_interval: self.config.snapshot_interval,
            dispatcher: Arc::clone(&self.dispatcher),
            cancel: cancel.cloned(),
        }
    }

    /// Restores dedup state from the configured checkpoint, once per
    /// session.
    fn seed_from_checkpoint(&mut self) {
        if self.checkpoint_loaded {
            return;
        }
        self.checkpoint_loaded = true;
        let Some(path) = &self.config.checkpoint_path else {
            return;
        };
        if let Some(checkpoint) = Checkpoint::load(path) {
            self.discovered.extend(checkpoint.hashes());
            self.total_rules = checkpoint.rule_count;
        }
    }

    fn write_checkpoint(&self, stats: &DiscoveryStats) {
        let Some(path) = &self.config.checkpoint_path else {
            return;
        };
        let checkpoint = Checkpoint::from_hashes(&self.discovered, self.total_rules, stats.clone());
        if checkpoint.write(path) {
            self.dispatcher.emit_checkpoint_written(&CheckpointWrittenEvent {
                path: path.clone(),
                rule_count: self.total_rules,
            });
        }
    }
}
