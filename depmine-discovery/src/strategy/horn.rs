//! Horn rule strategy.
//!
//! Horn candidates take a single head literal; splits are ordered so that
//! heads over boolean or otherwise flag-like columns are explored first,
//! since those make the most readable implications. Scoring is the shared
//! body/head join counting.

use depmine_core::errors::StorageError;
use depmine_core::traits::RelationalStore;
use depmine_core::types::kind::DependencyKind;

use crate::candidate::{enumerate_single_head_splits, CandidateRule, Split};
use crate::compat::Oracle;
use crate::identity::{AttributeMapper, JoinablePair};
use crate::rules::{HornRule, Rule, RuleCore};
use crate::strategy::{
    all_predicates, build_join_space, feasible_via_exists, predicate_display, score_body_head,
    RuleStrategy, SearchSpace,
};

#[derive(Debug, Default)]
pub struct HornStrategy;

/// Columns with at most this many distinct values read as enumerations.
const FLAG_CARDINALITY_MAX: u64 = 8;

/// Whether either endpoint of the pair looks like a flag column: a boolean
/// domain, or a cardinality small enough to be an enumeration.
fn flag_like(mapper: &AttributeMapper, pair: JoinablePair) -> bool {
    [pair.lo(), pair.hi()].iter().any(|&side| {
        let boolean = mapper
            .attribute(side)
            .and_then(|attr| attr.domain.as_deref())
            .map(|domain| domain.to_ascii_lowercase().contains("bool"))
            .unwrap_or(false);
        boolean || mapper.distinct_count(side.table, side.attribute) <= FLAG_CARDINALITY_MAX
    })
}

impl RuleStrategy for HornStrategy {
    fn kind(&self) -> DependencyKind {
        DependencyKind::Horn
    }

    fn init(
        &self,
        store: &dyn RelationalStore,
        oracle: &Oracle,
        max_occurrence: u32,
        request_indexes: bool,
    ) -> Result<SearchSpace, StorageError> {
        build_join_space(store, oracle, max_occurrence, request_indexes)
    }

    fn path_feasible(
        &self,
        store: &dyn RelationalStore,
        mapper: &AttributeMapper,
        candidate: &CandidateRule,
    ) -> bool {
        match all_predicates(mapper, candidate) {
            Some(predicates) => feasible_via_exists(store, &predicates, false),
            None => false,
        }
    }

    fn split_candidate(&self, mapper: &AttributeMapper, candidate: &CandidateRule) -> Vec<Split> {
        let mut splits = enumerate_single_head_splits(candidate.len());
        // Stable partition keeps the in-group order deterministic.
        splits.sort_by_key(|split| {
            let head = split.head.first().and_then(|&p| candidate.pair(p));
            match head {
                Some(pair) if flag_like(mapper, pair) => 0u8,
                _ => 1,
            }
        });
        splits
    }

    fn score_split(
        &self,
        store: &dyn RelationalStore,
        mapper: &AttributeMapper,
        candidate: &CandidateRule,
        split: &Split,
        floor: f64,
    ) -> Option<(f64, f64)> {
        score_body_head(store, mapper, candidate, split, false, floor)
    }

    fn instantiate(
        &self,
        mapper: &AttributeMapper,
        candidate: &CandidateRule,
        split: &Split,
        support: f64,
        confidence: f64,
    ) -> Option<Rule> {
        let body: Vec<String> = split
            .body
            .iter()
            .map(|&p| Some(predicate_display(mapper, candidate.pair(p)?)))
            .collect::<Option<_>>()?;
        let head = predicate_display(mapper, candidate.pair(*split.head.first()?)?);
        let display = format!("{} \u{21d2} {head}", body.join(" \u{2227} "));
        Some(Rule::Horn(HornRule {
            core: RuleCore {
                body,
                head: vec![head],
                support,
                confidence,
                display,
            },
        }))
    }
}
