//! Best-first candidate enumeration with a pluggable heuristic.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use crate::candidate::CandidateRule;
use crate::graph::ConstraintGraph;
use crate::identity::JoinablePair;

use super::{admit_start, extensions, start_nodes, Branch, SearchBudgets, TraversalGuide};

/// Estimates how promising a path is. Higher scores are better; the engine
/// negates the score into its priority so that promising paths pop first.
pub trait PathHeuristic {
    fn score(&self, path: &CandidateRule) -> f64;
}

/// Scores a path by its length. Since the cost term is also the path length,
/// priorities collapse to a constant and the engine degrades to insertion
/// order, which matches breadth-first exploration.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathLengthHeuristic;

impl PathHeuristic for PathLengthHeuristic {
    fn score(&self, path: &CandidateRule) -> f64 {
        path.len() as f64
    }
}

struct Prioritized {
    priority: f64,
    seq: u64,
    branch: Branch,
}

impl PartialEq for Prioritized {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for Prioritized {}

impl PartialOrd for Prioritized {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Prioritized {
    // Reversed so the max-heap pops the lowest priority; equal priorities
    // break ties by insertion sequence, keeping the order deterministic.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Best-first iterator over feasible path prefixes. A branch's priority is
/// its path length minus its heuristic score, computed at insertion.
pub struct AStarTraversal<G: TraversalGuide, H: PathHeuristic> {
    graph: Arc<ConstraintGraph>,
    guide: G,
    heuristic: H,
    budgets: SearchBudgets,
    heap: BinaryHeap<Prioritized>,
    seq: u64,
    starts: std::vec::IntoIter<JoinablePair>,
}

impl<G: TraversalGuide, H: PathHeuristic> AStarTraversal<G, H> {
    pub fn new(
        graph: Arc<ConstraintGraph>,
        guide: G,
        heuristic: H,
        budgets: SearchBudgets,
        start: Option<JoinablePair>,
    ) -> Self {
        let starts = start_nodes(&graph, start).into_iter();
        Self {
            graph,
            guide,
            heuristic,
            budgets,
            heap: BinaryHeap::new(),
            seq: 0,
            starts,
        }
    }

    fn push(&mut self, branch: Branch) {
        let priority = branch.path.len() as f64 - self.heuristic.score(&branch.path);
        let seq = self.seq;
        self.seq += 1;
        self.heap.push(Prioritized {
            priority,
            seq,
            branch,
        });
    }
}

impl<G: TraversalGuide, H: PathHeuristic> Iterator for AStarTraversal<G, H> {
    type Item = CandidateRule;

    fn next(&mut self) -> Option<CandidateRule> {
        loop {
            if let Some(entry) = self.heap.pop() {
                let branch = entry.branch;
                if !self.guide.feasible(&branch.path) {
                    continue;
                }
                for next in extensions(&self.graph, &branch, &self.guide, &self.budgets) {
                    self.push(branch.extend(next));
                }
                return Some(branch.path);
            }
            let start = self.starts.next()?;
            if admit_start(&self.guide, start, &self.budgets) {
                let branch = Branch::start(start);
                self.push(branch);
            }
        }
    }
}
