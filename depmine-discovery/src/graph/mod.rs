//! Constraint graph over joinable attribute pairs.
//!
//! Nodes are canonical [`JoinablePair`]s; an undirected edge connects two
//! pairs exactly when they share a table occurrence. The graph is backed by
//! ordered sets so that node iteration and neighbor iteration are sorted and
//! therefore deterministic, which in turn makes every traversal order
//! reproducible for a fixed store snapshot.

use std::collections::{BTreeMap, BTreeSet};

use crate::identity::JoinablePair;

#[derive(Debug, Clone, Default)]
pub struct ConstraintGraph {
    nodes: BTreeSet<JoinablePair>,
    adjacency: BTreeMap<JoinablePair, BTreeSet<JoinablePair>>,
}

impl ConstraintGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from a set of pairs, connecting every two pairs that
    /// share a table occurrence. Quadratic in the pair count; search spaces
    /// are bounded by the occurrence budget so this stays small in practice.
    pub fn from_pairs(pairs: &[JoinablePair]) -> Self {
        let mut graph = Self::new();
        for pair in pairs {
            graph.add_node(*pair);
        }
        for (i, a) in pairs.iter().enumerate() {
            for b in &pairs[i + 1..] {
                if a != b && a.shares_occurrence(b) {
                    graph.add_edge(*a.min(b), *a.max(b));
                }
            }
        }
        graph
    }

    pub fn add_node(&mut self, node: JoinablePair) {
        self.nodes.insert(node);
        self.adjacency.entry(node).or_default();
    }

    /// Adds the undirected edge `a - b`. Endpoints must be distinct and in
    /// canonical order; passing them unordered is a caller bug.
    pub fn add_edge(&mut self, a: JoinablePair, b: JoinablePair) {
        debug_assert!(a < b, "edge endpoints must be in canonical order");
        self.add_node(a);
        self.add_node(b);
        if let Some(set) = self.adjacency.get_mut(&a) {
            set.insert(b);
        }
        if let Some(set) = self.adjacency.get_mut(&b) {
            set.insert(a);
        }
    }

    pub fn contains(&self, node: &JoinablePair) -> bool {
        self.nodes.contains(node)
    }

    /// Nodes in canonical sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = JoinablePair> + '_ {
        self.nodes.iter().copied()
    }

    /// Neighbors of `node` in canonical sorted order. Empty for unknown nodes.
    pub fn neighbors(&self, node: &JoinablePair) -> impl Iterator<Item = JoinablePair> + '_ {
        self.adjacency
            .get(node)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }
}
