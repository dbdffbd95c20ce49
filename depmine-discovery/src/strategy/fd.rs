//! Functional dependency strategy.
//!
//! The FD search space models each table as a self-join: every column `c` of
//! table `t` becomes the pair `(t#0.c, t#1.c)`, so a path through the graph
//! selects a column set of one table. Scoring never runs the self-join; an
//! FD `X → Y` holds exactly when `distinct(X) = distinct(X ∪ Y)`, so both
//! metrics come from two distinct-count aggregates:
//! support = distinct(X) / rows, confidence = distinct(X) / distinct(X ∪ Y).

use std::sync::Arc;

use tracing::warn;

use depmine_core::errors::StorageError;
use depmine_core::traits::RelationalStore;
use depmine_core::types::kind::{CompatibilityMode, DependencyKind};

use crate::candidate::{enumerate_splits, CandidateRule, Split};
use crate::compat::Oracle;
use crate::graph::ConstraintGraph;
use crate::identity::{AttributeMapper, IndexedAttribute, JoinablePair};
use crate::rules::{FunctionalDependency, Rule, RuleCore};
use crate::strategy::{RuleStrategy, SearchSpace};

#[derive(Debug, Default)]
pub struct FdStrategy;

impl FdStrategy {
    /// Table and column names selected by the given positions. `None` when
    /// the mapper cannot resolve the candidate.
    fn columns<'a>(
        &self,
        mapper: &'a AttributeMapper,
        candidate: &CandidateRule,
        positions: &[usize],
    ) -> Option<(u32, Vec<&'a str>)> {
        let first = candidate.pair(0)?;
        let table = first.lo().table;
        let mut names = Vec::with_capacity(positions.len());
        for &p in positions {
            let pair = candidate.pair(p)?;
            names.push(mapper.attribute(pair.lo())?.name.as_str());
        }
        Some((table, names))
    }
}

impl RuleStrategy for FdStrategy {
    fn kind(&self) -> DependencyKind {
        DependencyKind::Fd
    }

    fn init(
        &self,
        store: &dyn RelationalStore,
        oracle: &Oracle,
        _max_occurrence: u32,
        request_indexes: bool,
    ) -> Result<SearchSpace, StorageError> {
        let mapper = AttributeMapper::from_store(store)?;
        let mut pairs = Vec::new();
        for table in 0..mapper.table_count() as u32 {
            let attrs = mapper.attributes(table);
            if mapper.row_count(table) == 0 || attrs.len() < 2 {
                continue;
            }
            // Key-candidate mode narrows FD search to tables with a
            // declared key; other modes are structural no-ops here.
            if oracle.mode() == CompatibilityMode::KeyCandidate
                && !attrs.iter().any(|a| a.is_key)
            {
                continue;
            }
            for (column, attr) in attrs.iter().enumerate() {
                if request_indexes {
                    store.ensure_composite_index(&attr.table, &[&attr.name])?;
                }
                pairs.push(JoinablePair::new(
                    IndexedAttribute::new(table, 0, column as u32),
                    IndexedAttribute::new(table, 1, column as u32),
                ));
            }
        }
        pairs.sort_unstable();
        let graph = ConstraintGraph::from_pairs(&pairs);
        Ok(SearchSpace {
            graph: Arc::new(graph),
            mapper: Arc::new(mapper),
            pairs,
        })
    }

    /// FD candidates select columns of one table; any non-empty table can
    /// satisfy them, so feasibility is just a row-count check.
    fn path_feasible(
        &self,
        _store: &dyn RelationalStore,
        mapper: &AttributeMapper,
        candidate: &CandidateRule,
    ) -> bool {
        match candidate.pair(0) {
            Some(first) => mapper.row_count(first.lo().table) > 0,
            None => false,
        }
    }

    fn split_candidate(&self, _mapper: &AttributeMapper, candidate: &CandidateRule) -> Vec<Split> {
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
        let (table, body_cols) = self.columns(mapper, candidate, &split.body)?;
        let all_positions: Vec<usize> = (0..candidate.len()).collect();
        let (_, all_cols) = self.columns(mapper, candidate, &all_positions)?;
        let table_name = mapper.table_name(table)?;
        let rows = mapper.row_count(table);
        if rows == 0 {
            return None;
        }

        let distinct_body = match store.distinct_count(table_name, &body_cols) {
            Ok(count) => count,
            Err(error) => {
                warn!(table = table_name, %error, "distinct count failed; rejecting split");
                return None;
            }
        };
        let distinct_all = match store.distinct_count(table_name, &all_cols) {
            Ok(count) => count,
            Err(error) => {
                warn!(table = table_name, %error, "distinct count failed; rejecting split");
                return None;
            }
        };
        if distinct_all == 0 {
            return None;
        }

        let support = distinct_body as f64 / rows as f64;
        let confidence = distinct_body as f64 / distinct_all as f64;
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
        let (table, body_cols) = self.columns(mapper, candidate, &split.body)?;
        let (_, head_cols) = self.columns(mapper, candidate, &split.head)?;
        let table_name = mapper.table_name(table)?.to_owned();
        let body: Vec<String> = body_cols
            .iter()
            .map(|c| format!("{table_name}.{c}"))
            .collect();
        let head: Vec<String> = head_cols
            .iter()
            .map(|c| format!("{table_name}.{c}"))
            .collect();
        let display = format!(
            "{table_name}: {} \u{2192} {}",
            body_cols.join(", "),
            head_cols.join(", ")
        );
        Some(Rule::Fd(FunctionalDependency {
            core: RuleCore {
                body,
                head,
                support,
                confidence,
                display,
            },
            table: table_name,
        }))
    }
}
