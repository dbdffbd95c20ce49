//! Dependency discovery engine.
//!
//! Discovers candidate data dependencies (functional dependencies, tuple- and
//! equality-generating dependencies, Horn rules) over a relational store by
//! searching a joinability graph whose nodes are canonical attribute pairs.
//! Candidates found by graph traversal are split into body/head assignments,
//! scored against live data with aggregate queries, and instantiated as
//! [`Rule`] values.
//!
//! The typical entry point is [`DiscoverySession`], which wires configuration,
//! compatibility oracles, strategies, and checkpointing together; lower layers
//! ([`RuleDiscoveryCore`], the traversal engines, [`RuleStrategy`]) are public
//! for callers that need finer control.

pub mod candidate;
pub mod checkpoint;
pub mod compat;
pub mod core;
pub mod facade;
pub mod graph;
pub mod identity;
pub mod registry;
pub mod rules;
pub mod stats;
pub mod strategy;
pub mod traversal;

pub use candidate::{CandidateRule, InclusionAnchor, Split};
pub use checkpoint::Checkpoint;
pub use compat::{Oracle, OracleConfig};
pub use crate::core::{CoreState, DiscoverOptions, RuleDiscoveryCore, RuleStream};
pub use facade::{DiscoverySession, PhaseReport};
pub use graph::ConstraintGraph;
pub use identity::{Attribute, AttributeMapper, IndexedAttribute, JoinablePair};
pub use registry::CapabilityRegistry;
pub use rules::{EgdRule, FunctionalDependency, HornRule, Rule, RuleCore, TgdRule};
pub use stats::DiscoveryStats;
pub use strategy::{RuleStrategy, SearchSpace};
pub use traversal::{
    AStarTraversal, BfsTraversal, DfsTraversal, PathHeuristic, PathLengthHeuristic,
    SearchBudgets, TraversalAlgorithm, TraversalGuide,
};
