//! Lazy graph traversal engines.
//!
//! All three engines share the same contract: starting from each admitted
//! start node in canonical order, they yield every feasible path prefix
//! exactly once as a [`CandidateRule`], extending paths only through
//! unvisited neighbors of nodes already on the path. Branch state is copied
//! on extension, so sibling branches never observe each other's visited
//! sets. For a fixed graph, guide, and budgets the yielded sequence is fully
//! deterministic.

mod astar;
mod bfs;
mod dfs;

pub use astar::{AStarTraversal, PathHeuristic, PathLengthHeuristic};
pub use bfs::BfsTraversal;
pub use dfs::DfsTraversal;

use depmine_core::types::collections::FxHashSet;

use crate::candidate::CandidateRule;
use crate::graph::ConstraintGraph;
use crate::identity::{AttributeMapper, JoinablePair};

/// Hard limits on path growth, checked at admission time.
#[derive(Debug, Clone, Copy)]
pub struct SearchBudgets {
    /// Maximum distinct table occurrences a path may bind.
    pub max_table: usize,
    /// Maximum independent variables a path may leave unbound.
    pub max_vars: usize,
}

/// Decides which paths survive and which extensions are admitted.
///
/// `feasible` gates yielding (an infeasible path is dropped together with its
/// whole subtree); `admit` gates extension and must be monotone in the
/// budgets: tightening a budget may only remove admitted extensions, never
/// add them.
pub trait TraversalGuide {
    fn feasible(&self, path: &CandidateRule) -> bool;
    fn admit(&self, path: &CandidateRule, next: JoinablePair, budgets: &SearchBudgets) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalAlgorithm {
    Dfs,
    Bfs,
    AStar,
}

impl TraversalAlgorithm {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dfs" => Some(Self::Dfs),
            "bfs" => Some(Self::Bfs),
            "astar" | "a-star" => Some(Self::AStar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dfs => "dfs",
            Self::Bfs => "bfs",
            Self::AStar => "astar",
        }
    }
}

/// Budget admission shared by the built-in guides: binding the occurrences of
/// `next` must keep the path within both the occurrence and the variable
/// budget.
pub fn budget_admit(
    mapper: &AttributeMapper,
    path: &CandidateRule,
    next: JoinablePair,
    budgets: &SearchBudgets,
) -> bool {
    let extended = path.extended(next);
    if extended.occurrences().len() > budgets.max_table {
        return false;
    }
    extended.independent_vars(mapper) <= budgets.max_vars
}

/// One branch of the search: the path so far plus its private visited set.
#[derive(Debug, Clone)]
pub(crate) struct Branch {
    pub path: CandidateRule,
    pub visited: FxHashSet<JoinablePair>,
}

impl Branch {
    pub fn start(node: JoinablePair) -> Self {
        let mut visited = FxHashSet::default();
        visited.insert(node);
        Self {
            path: CandidateRule::single(node),
            visited,
        }
    }

    pub fn extend(&self, node: JoinablePair) -> Self {
        let mut next = self.clone();
        next.path.push(node);
        next.visited.insert(node);
        next
    }
}

/// Admitted, unvisited extensions of a branch: neighbors of every path node,
/// in path order then neighbor order, deduplicated.
pub(crate) fn extensions<G: TraversalGuide>(
    graph: &ConstraintGraph,
    branch: &Branch,
    guide: &G,
    budgets: &SearchBudgets,
) -> Vec<JoinablePair> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    for node in branch.path.pairs() {
        for neighbor in graph.neighbors(node) {
            if branch.visited.contains(&neighbor) || !seen.insert(neighbor) {
                continue;
            }
            if guide.admit(&branch.path, neighbor, budgets) {
                out.push(neighbor);
            }
        }
    }
    out
}

/// Start nodes for a traversal: the requested node if it exists in the
/// graph, otherwise every node in canonical order.
pub(crate) fn start_nodes(
    graph: &ConstraintGraph,
    start: Option<JoinablePair>,
) -> Vec<JoinablePair> {
    match start {
        Some(node) if graph.contains(&node) => vec![node],
        Some(_) => Vec::new(),
        None => graph.nodes().collect(),
    }
}

/// Start-node admission reuses `admit` with an empty path.
pub(crate) fn admit_start<G: TraversalGuide>(
    guide: &G,
    node: JoinablePair,
    budgets: &SearchBudgets,
) -> bool {
    guide.admit(&CandidateRule::new(), node, budgets)
}
