//! Equality-generating dependency strategy.
//!
//! Candidates need at least two pairs; exactly one becomes the head equality
//! and the rest form the body join. Confidence is measured through violation
//! counting: the fraction of body-satisfying tuple combinations where the
//! head columns differ. Body joins run with disjoint semantics so a row
//! never witnesses an equality against itself.

use depmine_core::errors::StorageError;
use depmine_core::traits::RelationalStore;
use depmine_core::types::kind::DependencyKind;
use depmine_core::types::schema::JoinPredicate;

use crate::candidate::{enumerate_single_head_splits, CandidateRule, Split};
use crate::compat::Oracle;
use crate::identity::AttributeMapper;
use crate::rules::{EgdRule, Rule, RuleCore};
use crate::strategy::{
    all_predicates, build_join_space, feasible_via_exists, predicate_display, predicates_for,
    position_occurrences, rowid_projection, run_count, RuleStrategy, SearchSpace,
};

#[derive(Debug, Default)]
pub struct EgdStrategy;

impl RuleStrategy for EgdStrategy {
    fn kind(&self) -> DependencyKind {
        DependencyKind::Egd
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
            Some(predicates) => feasible_via_exists(store, &predicates, true),
            None => false,
        }
    }

    fn split_candidate(&self, _mapper: &AttributeMapper, candidate: &CandidateRule) -> Vec<Split> {
        enumerate_single_head_splits(candidate.len())
    }

    fn score_split(
        &self,
        store: &dyn RelationalStore,
        mapper: &AttributeMapper,
        candidate: &CandidateRule,
        split: &Split,
        floor: f64,
    ) -> Option<(f64, f64)> {
        let body_preds = predicates_for(mapper, candidate, &split.body)?;
        let head_position = *split.head.first()?;
        let head_pair = candidate.pair(head_position)?;
        let head_eq = JoinPredicate::eq(mapper.scoped(head_pair.lo())?, mapper.scoped(head_pair.hi())?);
        let head_ne = JoinPredicate::ne(mapper.scoped(head_pair.lo())?, mapper.scoped(head_pair.hi())?);

        let combos = run_count(store, &body_preds, true, None)?;
        if combos == 0 {
            return None;
        }
        let mut violating = body_preds.clone();
        violating.push(head_ne);
        let violations = run_count(store, &violating, true, None)?;
        let confidence = 1.0 - violations as f64 / combos as f64;

        let body_occs = position_occurrences(candidate, &split.body);
        let projection = rowid_projection(mapper, &body_occs)?;
        let mut satisfying = body_preds;
        satisfying.push(head_eq);
        let satisfied = run_count(store, &satisfying, true, Some(&projection))?;

        let mut population = 1.0_f64;
        for &(table, _) in &body_occs {
            population *= mapper.row_count(table) as f64;
        }
        if population == 0.0 {
            return None;
        }
        let support = satisfied as f64 / population;
        if support < floor || confidence < floor {
            return None;
        }
        Some((support, confidence))
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
        let head_pair = candidate.pair(*split.head.first()?)?;
        let left = mapper.display(head_pair.lo());
        let right = mapper.display(head_pair.hi());
        let display = format!("{} \u{21d2} {left} = {right}", body.join(" \u{2227} "));
        Some(Rule::Egd(EgdRule {
            core: RuleCore {
                body,
                head: vec![format!("{left} = {right}")],
                support,
                confidence,
                display,
            },
            left,
            right,
        }))
    }
}
