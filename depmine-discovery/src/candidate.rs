//! Candidate rules (traversal paths) and body/head splits.

use std::collections::BTreeSet;

use smallvec::SmallVec;

use crate::identity::{AttributeMapper, JoinablePair};

/// An ordered path of joinable pairs produced by traversal.
///
/// The order is the discovery order and is preserved so that split positions
/// are stable; set-like comparisons go through structural hashing of the
/// instantiated rule instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CandidateRule {
    pairs: SmallVec<[JoinablePair; 4]>,
}

impl CandidateRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(pair: JoinablePair) -> Self {
        let mut pairs = SmallVec::new();
        pairs.push(pair);
        Self { pairs }
    }

    pub fn push(&mut self, pair: JoinablePair) {
        self.pairs.push(pair);
    }

    /// Copy-on-branch extension used by the traversal engines.
    pub fn extended(&self, pair: JoinablePair) -> Self {
        let mut next = self.clone();
        next.push(pair);
        next
    }

    pub fn pairs(&self) -> &[JoinablePair] {
        &self.pairs
    }

    pub fn pair(&self, position: usize) -> Option<JoinablePair> {
        self.pairs.get(position).copied()
    }

    pub fn contains(&self, pair: &JoinablePair) -> bool {
        self.pairs.contains(pair)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Distinct table occurrences touched by the path, sorted.
    pub fn occurrences(&self) -> BTreeSet<(u32, u32)> {
        self.pairs
            .iter()
            .flat_map(|p| p.occurrences())
            .collect()
    }

    /// Independent variables of the candidate: every column of every bound
    /// occurrence contributes one variable, and each join predicate unifies
    /// two of them.
    pub fn independent_vars(&self, mapper: &AttributeMapper) -> usize {
        let columns: usize = self
            .occurrences()
            .iter()
            .map(|(table, _)| mapper.column_count(*table))
            .sum();
        columns.saturating_sub(self.pairs.len())
    }
}

/// Which side of a singleton inclusion candidate anchors the containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InclusionAnchor {
    Lo,
    Hi,
}

/// A body/head assignment over the positions of a candidate.
///
/// For every kind except singleton inclusion candidates, `body` and `head`
/// partition `0..len` and are both non-empty. Inclusion splits carry an empty
/// body and an [`InclusionAnchor`] naming the contained side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub body: Vec<usize>,
    pub head: Vec<usize>,
    pub inclusion_anchor: Option<InclusionAnchor>,
}

impl Split {
    pub fn new(mut body: Vec<usize>, mut head: Vec<usize>) -> Self {
        body.sort_unstable();
        head.sort_unstable();
        Self {
            body,
            head,
            inclusion_anchor: None,
        }
    }

    pub fn inclusion(anchor: InclusionAnchor) -> Self {
        Self {
            body: Vec::new(),
            head: vec![0],
            inclusion_anchor: Some(anchor),
        }
    }

    pub fn is_inclusion(&self) -> bool {
        self.inclusion_anchor.is_some()
    }

    /// Whether body and head are disjoint, non-empty, and together cover
    /// every position of a candidate of length `len`.
    pub fn is_partition_of(&self, len: usize) -> bool {
        if self.body.is_empty() || self.head.is_empty() {
            return false;
        }
        let mut seen = vec![false; len];
        for &p in self.body.iter().chain(self.head.iter()) {
            if p >= len || seen[p] {
                return false;
            }
            seen[p] = true;
        }
        seen.into_iter().all(|s| s)
    }
}

/// Every assignment of `len` positions into a non-empty body and non-empty
/// head. Deterministic order: the bitmask of head membership, ascending.
pub(crate) fn enumerate_splits(len: usize) -> Vec<Split> {
    if len < 2 || len >= usize::BITS as usize {
        return Vec::new();
    }
    let mut splits = Vec::with_capacity((1usize << len) - 2);
    for mask in 1..((1usize << len) - 1) {
        let mut body = Vec::new();
        let mut head = Vec::new();
        for position in 0..len {
            if mask & (1 << position) != 0 {
                head.push(position);
            } else {
                body.push(position);
            }
        }
        splits.push(Split::new(body, head));
    }
    splits
}

/// Assignments with exactly one head position, for kinds whose head is a
/// single atom.
pub(crate) fn enumerate_single_head_splits(len: usize) -> Vec<Split> {
    if len < 2 {
        return Vec::new();
    }
    (0..len)
        .map(|head| {
            let body = (0..len).filter(|&p| p != head).collect();
            Split::new(body, vec![head])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_partition_all_positions() {
        let splits = enumerate_splits(3);
        assert_eq!(splits.len(), 6);
        for split in &splits {
            assert!(split.is_partition_of(3));
        }
    }

    #[test]
    fn no_splits_below_two_positions() {
        assert!(enumerate_splits(0).is_empty());
        assert!(enumerate_splits(1).is_empty());
        assert!(enumerate_single_head_splits(1).is_empty());
    }

    #[test]
    fn single_head_splits_have_one_head() {
        let splits = enumerate_single_head_splits(3);
        assert_eq!(splits.len(), 3);
        for split in &splits {
            assert_eq!(split.head.len(), 1);
            assert!(split.is_partition_of(3));
        }
    }

    #[test]
    fn empty_body_fails_partition_check() {
        let split = Split::inclusion(InclusionAnchor::Lo);
        assert!(!split.is_partition_of(1));
    }
}
