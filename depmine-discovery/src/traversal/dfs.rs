//! Depth-first candidate enumeration.

use std::sync::Arc;

use crate::candidate::CandidateRule;
use crate::graph::ConstraintGraph;
use crate::identity::JoinablePair;

use super::{admit_start, extensions, start_nodes, Branch, SearchBudgets, TraversalGuide};

/// Pre-order depth-first iterator over feasible path prefixes.
///
/// Extensions of a popped branch are pushed in reverse so that siblings are
/// explored in canonical neighbor order. Start nodes are exhausted one at a
/// time; the next start is seeded only after the current subtree is drained.
pub struct DfsTraversal<G: TraversalGuide> {
    graph: Arc<ConstraintGraph>,
    guide: G,
    budgets: SearchBudgets,
    stack: Vec<Branch>,
    starts: std::vec::IntoIter<JoinablePair>,
}

impl<G: TraversalGuide> DfsTraversal<G> {
    pub fn new(
        graph: Arc<ConstraintGraph>,
        guide: G,
        budgets: SearchBudgets,
        start: Option<JoinablePair>,
    ) -> Self {
        let starts = start_nodes(&graph, start).into_iter();
        Self {
            graph,
            guide,
            budgets,
            stack: Vec::new(),
            starts,
        }
    }
}

impl<G: TraversalGuide> Iterator for DfsTraversal<G> {
    type Item = CandidateRule;

    fn next(&mut self) -> Option<CandidateRule> {
        loop {
            if let Some(branch) = self.stack.pop() {
                if !self.guide.feasible(&branch.path) {
                    continue;
                }
                let mut exts = extensions(&self.graph, &branch, &self.guide, &self.budgets);
                exts.reverse();
                for next in exts {
                    self.stack.push(branch.extend(next));
                }
                return Some(branch.path);
            }
            let start = self.starts.next()?;
            if admit_start(&self.guide, start, &self.budgets) {
                self.stack.push(Branch::start(start));
            }
        }
    }
}
