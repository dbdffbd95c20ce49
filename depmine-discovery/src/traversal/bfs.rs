//! Breadth-first candidate enumeration.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::candidate::CandidateRule;
use crate::graph::ConstraintGraph;
use crate::identity::JoinablePair;

use super::{admit_start, extensions, start_nodes, Branch, SearchBudgets, TraversalGuide};

/// Level-order iterator over feasible path prefixes, one start node at a
/// time. Within a level, branches keep the order their parents were expanded
/// in, and siblings follow canonical neighbor order.
pub struct BfsTraversal<G: TraversalGuide> {
    graph: Arc<ConstraintGraph>,
    guide: G,
    budgets: SearchBudgets,
    queue: VecDeque<Branch>,
    starts: std::vec::IntoIter<JoinablePair>,
}

impl<G: TraversalGuide> BfsTraversal<G> {
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
            queue: VecDeque::new(),
            starts,
        }
    }
}

impl<G: TraversalGuide> Iterator for BfsTraversal<G> {
    type Item = CandidateRule;

    fn next(&mut self) -> Option<CandidateRule> {
        loop {
            if let Some(branch) = self.queue.pop_front() {
                if !self.guide.feasible(&branch.path) {
                    continue;
                }
                for next in extensions(&self.graph, &branch, &self.guide, &self.budgets) {
                    self.queue.push_back(branch.extend(next));
                }
                return Some(branch.path);
            }
            let start = self.starts.next()?;
            if admit_start(&self.guide, start, &self.budgets) {
                self.queue.push_back(Branch::start(start));
            }
        }
    }
}
