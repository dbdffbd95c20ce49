//! Tuple-generating dependency strategy.
//!
//! General candidates split into a body join and an existentially quantified
//! head join. Single-pair candidates degenerate to inclusion rules
//! (`a ⊆ b`): both containment directions are tried and a direction is only
//! accepted when every non-null anchor value has a match, so inclusion rules
//! always carry confidence 1.0.

use tracing::warn;

use depmine_core::errors::StorageError;
use depmine_core::traits::RelationalStore;
use depmine_core::types::kind::DependencyKind;
use depmine_core::types::schema::ScopedColumn;

use crate::candidate::{enumerate_splits, CandidateRule, InclusionAnchor, Split};
use crate::compat::Oracle;
use crate::identity::{AttributeMapper, IndexedAttribute};
use crate::rules::{Rule, RuleCore, TgdRule};
use crate::strategy::{
    all_predicates, build_join_space, feasible_via_exists, predicate_display, predicate_for,
    run_count, score_body_head, RuleStrategy, SearchSpace,
};

#[derive(Debug, Default)]
pub struct TgdStrategy;

/// Anchor and target endpoints of an inclusion split.
fn inclusion_sides(
    candidate: &CandidateRule,
    split: &Split,
) -> Option<(IndexedAttribute, IndexedAttribute)> {
    let pair = candidate.pair(0)?;
    match split.inclusion_anchor? {
        InclusionAnchor::Lo => Some((pair.lo(), pair.hi())),
        InclusionAnchor::Hi => Some((pair.hi(), pair.lo())),
    }
}

impl RuleStrategy for TgdStrategy {
    fn kind(&self) -> DependencyKind {
        DependencyKind::Tgd
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

    fn split_candidate(&self, _mapper: &AttributeMapper, candidate: &CandidateRule) -> Vec<Split> {
        if candidate.len() == 1 {
            return vec![
                Split::inclusion(InclusionAnchor::Lo),
                Split::inclusion(InclusionAnchor::Hi),
            ];
        }
        enumerate_splits(candidate.len())
    }

    fn score_split(
        &self,
        store: &dyn RelationalStore,
        mapper: &AttributeMapper,
        candidate: &CandidateRule,
        split: &Split,
        floor: f64,
    ) -> Option<(f64, f64)> {
        if !split.is_inclusion() {
            return score_body_head(store, mapper, candidate, split, false, floor);
        }

        let (anchor, target) = inclusion_sides(candidate, split)?;
        let from = mapper.qualified(anchor)?;
        let to = mapper.qualified(target)?;
        // A column trivially contains itself; nothing worth reporting.
        if from == to {
            return None;
        }
        let unmatched = match store.count_unmatched(&from, &to) {
            Ok(count) => count,
            Err(error) => {
                warn!(%error, "containment probe failed; rejecting split");
                return None;
            }
        };
        if unmatched > 0 {
            return None;
        }

        let rows = mapper.row_count(anchor.table);
        if rows == 0 {
            return None;
        }
        let predicate = predicate_for(mapper, candidate.pair(0)?)?;
        let projection = [ScopedColumn {
            table: from.table.clone(),
            occurrence: anchor.occurrence,
            column: "rowid".to_owned(),
        }];
        let matched = run_count(store, &[predicate], false, Some(&projection))?;

        // Containment held, so every non-null anchor value has a match.
        let support = matched as f64 / rows as f64;
        if support < floor {
            return None;
        }
        Some((support, 1.0))
    }

    fn instantiate(
        &self,
        mapper: &AttributeMapper,
        candidate: &CandidateRule,
        split: &Split,
        support: f64,
        confidence: f64,
    ) -> Option<Rule> {
        if split.is_inclusion() {
            let (anchor, target) = inclusion_sides(candidate, split)?;
            let from = mapper.qualified(anchor)?;
            let to = mapper.qualified(target)?;
            let body = format!("{}.{}", from.table, from.column);
            let head = format!("{}.{}", to.table, to.column);
            let display = format!("{body} \u{2286} {head}");
            return Some(Rule::Tgd(TgdRule {
                core: RuleCore {
                    body: vec![body],
                    head: vec![head],
                    support,
                    confidence,
                    display,
                },
                inclusion: true,
            }));
        }

        let body: Vec<String> = split
            .body
            .iter()
            .map(|&p| Some(predicate_display(mapper, candidate.pair(p)?)))
            .collect::<Option<_>>()?;
        let head: Vec<String> = split
            .head
            .iter()
            .map(|&p| Some(predicate_display(mapper, candidate.pair(p)?)))
            .collect::<Option<_>>()?;
        let display = format!(
            "{} \u{2192} \u{2203} {}",
            body.join(" \u{2227} "),
            head.join(" \u{2227} ")
        );
        Some(Rule::Tgd(TgdRule {
            core: RuleCore {
                body,
                head,
                support,
                confidence,
                display,
            },
            inclusion: false,
        }))
    }
}
