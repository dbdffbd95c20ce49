//! Rule strategies: one per dependency kind.
//!
//! A strategy owns everything kind-specific: which joinable pairs enter the
//! search space, when a path is still worth extending, how a candidate is
//! split into body and head, how a split is scored against live data, and how
//! an accepted split becomes a [`Rule`]. The traversal engines and the
//! discovery core are strategy-agnostic.

mod egd;
mod fd;
mod horn;
mod tgd;

pub use egd::EgdStrategy;
pub use fd::FdStrategy;
pub use horn::HornStrategy;
pub use tgd::TgdStrategy;

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::warn;

use depmine_core::errors::StorageError;
use depmine_core::traits::RelationalStore;
use depmine_core::types::kind::DependencyKind;
use depmine_core::types::schema::{JoinPredicate, ScopedColumn};

use crate::candidate::{CandidateRule, Split};
use crate::compat::Oracle;
use crate::graph::ConstraintGraph;
use crate::identity::{AttributeMapper, IndexedAttribute, JoinablePair};
use crate::rules::Rule;

/// The materialized search space one strategy initialization produces.
#[derive(Debug, Clone)]
pub struct SearchSpace {
    pub graph: Arc<ConstraintGraph>,
    pub mapper: Arc<AttributeMapper>,
    /// All pairs of the space in canonical order.
    pub pairs: Vec<JoinablePair>,
}

/// Kind-specific behavior plugged into the discovery core.
pub trait RuleStrategy: Send + Sync {
    fn kind(&self) -> DependencyKind;

    /// Builds the search space: enumerate compatible pairs, optionally ask
    /// the store for supporting indexes, and assemble the constraint graph.
    fn init(
        &self,
        store: &dyn RelationalStore,
        oracle: &Oracle,
        max_occurrence: u32,
        request_indexes: bool,
    ) -> Result<SearchSpace, StorageError>;

    /// Whether the path can still satisfy any data; infeasible paths are
    /// pruned together with their extensions.
    fn path_feasible(
        &self,
        store: &dyn RelationalStore,
        mapper: &AttributeMapper,
        candidate: &CandidateRule,
    ) -> bool;

    /// All body/head assignments this kind considers for the candidate, in
    /// deterministic order.
    fn split_candidate(&self, mapper: &AttributeMapper, candidate: &CandidateRule) -> Vec<Split>;

    /// Scores a split against live data. `None` rejects it, either because a
    /// quality metric fell below `floor` or because it cannot be evaluated.
    fn score_split(
        &self,
        store: &dyn RelationalStore,
        mapper: &AttributeMapper,
        candidate: &CandidateRule,
        split: &Split,
        floor: f64,
    ) -> Option<(f64, f64)>;

    /// Renders an accepted split as a rule. `None` only when the mapper can
    /// no longer resolve the candidate, which indicates a stale space.
    fn instantiate(
        &self,
        mapper: &AttributeMapper,
        candidate: &CandidateRule,
        split: &Split,
        support: f64,
        confidence: f64,
    ) -> Option<Rule>;
}

/// Equality predicate for one pair, resolved through the mapper.
pub(crate) fn predicate_for(
    mapper: &AttributeMapper,
    pair: JoinablePair,
) -> Option<JoinPredicate> {
    Some(JoinPredicate::eq(
        mapper.scoped(pair.lo())?,
        mapper.scoped(pair.hi())?,
    ))
}

pub(crate) fn predicates_for(
    mapper: &AttributeMapper,
    candidate: &CandidateRule,
    positions: &[usize],
) -> Option<Vec<JoinPredicate>> {
    positions
        .iter()
        .map(|&p| predicate_for(mapper, candidate.pair(p)?))
        .collect()
}

pub(crate) fn all_predicates(
    mapper: &AttributeMapper,
    candidate: &CandidateRule,
) -> Option<Vec<JoinPredicate>> {
    candidate
        .pairs()
        .iter()
        .map(|&pair| predicate_for(mapper, pair))
        .collect()
}

pub(crate) fn predicate_display(mapper: &AttributeMapper, pair: JoinablePair) -> String {
    format!("{} = {}", mapper.display(pair.lo()), mapper.display(pair.hi()))
}

/// Table occurrences bound by the given positions, sorted.
pub(crate) fn position_occurrences(
    candidate: &CandidateRule,
    positions: &[usize],
) -> BTreeSet<(u32, u32)> {
    positions
        .iter()
        .filter_map(|&p| candidate.pair(p))
        .flat_map(|pair| pair.occurrences())
        .collect()
}

/// One rowid column per occurrence, used as the distinct projection when
/// counting satisfying body tuples.
pub(crate) fn rowid_projection(
    mapper: &AttributeMapper,
    occurrences: &BTreeSet<(u32, u32)>,
) -> Option<Vec<ScopedColumn>> {
    occurrences
        .iter()
        .map(|&(table, occurrence)| {
            Some(ScopedColumn {
                table: mapper.table_name(table)?.to_owned(),
                occurrence,
                column: "rowid".to_owned(),
            })
        })
        .collect()
}

/// Scores a body/head split with join counting:
/// support = joint combinations / all body-occurrence combinations,
/// confidence = joint combinations / body-satisfying combinations.
/// Counting is distinct over the body occurrences' rowids so head-side join
/// blowup cannot inflate either metric.
pub(crate) fn score_body_head(
    store: &dyn RelationalStore,
    mapper: &AttributeMapper,
    candidate: &CandidateRule,
    split: &Split,
    disjoint: bool,
    floor: f64,
) -> Option<(f64, f64)> {
    let body_preds = predicates_for(mapper, candidate, &split.body)?;
    let all_preds = all_predicates(mapper, candidate)?;
    let body_occs = position_occurrences(candidate, &split.body);
    let projection = rowid_projection(mapper, &body_occs)?;

    let joint = run_count(store, &all_preds, disjoint, Some(&projection))?;
    let body_count = run_count(store, &body_preds, disjoint, Some(&projection))?;
    if body_count == 0 {
        return None;
    }

    let mut population = 1.0_f64;
    for &(table, _) in &body_occs {
        population *= mapper.row_count(table) as f64;
    }
    if population == 0.0 {
        return None;
    }

    let support = joint as f64 / population;
    let confidence = joint as f64 / body_count as f64;
    if support < floor || confidence < floor {
        return None;
    }
    Some((support, confidence))
}

/// Count wrapper that downgrades query failures to a logged rejection.
pub(crate) fn run_count(
    store: &dyn RelationalStore,
    predicates: &[JoinPredicate],
    disjoint: bool,
    distinct_over: Option<&[ScopedColumn]>,
) -> Option<u64> {
    match store.count_join(predicates, disjoint, distinct_over) {
        Ok(count) => Some(count),
        Err(error) => {
            warn!(%error, "count query failed; rejecting split");
            None
        }
    }
}

/// Feasibility via an existence probe; query failures prune the path.
pub(crate) fn feasible_via_exists(
    store: &dyn RelationalStore,
    predicates: &[JoinPredicate],
    disjoint: bool,
) -> bool {
    match store.exists_join(predicates, disjoint) {
        Ok(exists) => exists,
        Err(error) => {
            warn!(%error, "existence probe failed; pruning path");
            false
        }
    }
}

/// Enumerates compatible column pairs into a search space shared by the TGD,
/// EGD, and Horn strategies. Every occurrence combination within the budget
/// becomes its own pair. A column paired with itself across two occurrences
/// is always admitted (it joins identical values), which is what lets EGD
/// candidates express functional constraints through self-joins.
pub(crate) fn build_join_space(
    store: &dyn RelationalStore,
    oracle: &Oracle,
    max_occurrence: u32,
    request_indexes: bool,
) -> Result<SearchSpace, StorageError> {
    let mapper = AttributeMapper::from_store(store)?;
    let max_occurrence = max_occurrence.max(1);
    let mut pairs = Vec::new();

    for ti in 0..mapper.table_count() as u32 {
        for tj in ti..mapper.table_count() as u32 {
            let left_attrs = mapper.attributes(ti);
            let right_attrs = mapper.attributes(tj);
            for (ai, left) in left_attrs.iter().enumerate() {
                let aj_start = if ti == tj { ai } else { 0 };
                for (aj, right) in right_attrs.iter().enumerate().skip(aj_start) {
                    let same_column = ti == tj && ai == aj;
                    let compatible = if same_column {
                        true
                    } else {
                        match oracle.is_compatible(store, left, right) {
                            Ok(c) => c,
                            Err(error) => {
                                warn!(
                                    left = %left.name, right = %right.name, %error,
                                    "compatibility probe failed; skipping pair"
                                );
                                continue;
                            }
                        }
                    };
                    if !compatible {
                        continue;
                    }
                    if request_indexes {
                        store.ensure_composite_index(&left.table, &[&left.name])?;
                        store.ensure_composite_index(&right.table, &[&right.name])?;
                    }
                    for oi in 0..max_occurrence {
                        let oj_start = if !same_column && ti == tj {
                            oi
                        } else if same_column {
                            oi + 1
                        } else {
                            0
                        };
                        for oj in oj_start..max_occurrence {
                            pairs.push(JoinablePair::new(
                                IndexedAttribute::new(ti, oi, ai as u32),
                                IndexedAttribute::new(tj, oj, aj as u32),
                            ));
                        }
                    }
                }
            }
        }
    }

    pairs.sort_unstable();
    pairs.dedup();
    let graph = ConstraintGraph::from_pairs(&pairs);
    Ok(SearchSpace {
        graph: Arc::new(graph),
        mapper: Arc::new(mapper),
        pairs,
    })
}
