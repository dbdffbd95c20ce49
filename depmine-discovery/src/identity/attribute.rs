//! Core identity types for the search space.

use serde::{Deserialize, Serialize};

/// One column of one table as seen at session start.
///
/// Identity is the (table, name) pair; `domain` and `is_key` are advisory
/// metadata used by compatibility checks and head selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub table: String,
    pub name: String,
    /// Declared type of the column, if the store reports one.
    pub domain: Option<String>,
    pub is_key: bool,
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table && self.name == other.name
    }
}

impl Eq for Attribute {}

impl std::hash::Hash for Attribute {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.table.hash(state);
        self.name.hash(state);
    }
}

/// A column of a specific occurrence of a table inside one candidate body.
///
/// Occurrences let a rule refer to the same table more than once (self-joins).
/// Field order gives the derived `Ord` the lexicographic
/// (table, occurrence, attribute) meaning the canonical pair ordering relies
/// on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexedAttribute {
    pub table: u32,
    pub occurrence: u32,
    pub attribute: u32,
}

impl IndexedAttribute {
    pub fn new(table: u32, occurrence: u32, attribute: u32) -> Self {
        Self {
            table,
            occurrence,
            attribute,
        }
    }

    /// The table occurrence this attribute is bound to.
    pub fn occurrence_key(&self) -> (u32, u32) {
        (self.table, self.occurrence)
    }
}

/// Canonical unordered pair of indexed attributes.
///
/// A pair is one candidate join predicate and one node of the constraint
/// graph. Construction sorts the endpoints, so two pairs built from the same
/// attributes in either order compare and hash identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JoinablePair {
    lo: IndexedAttribute,
    hi: IndexedAttribute,
}

impl JoinablePair {
    pub fn new(a: IndexedAttribute, b: IndexedAttribute) -> Self {
        debug_assert_ne!(a, b, "a joinable pair needs two distinct attributes");
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    pub fn lo(&self) -> IndexedAttribute {
        self.lo
    }

    pub fn hi(&self) -> IndexedAttribute {
        self.hi
    }

    /// Both table occurrences touched by this pair. The two entries are equal
    /// when the pair joins two columns of the same occurrence.
    pub fn occurrences(&self) -> [(u32, u32); 2] {
        [self.lo.occurrence_key(), self.hi.occurrence_key()]
    }

    /// Whether the two pairs touch a common table occurrence. This is the
    /// edge relation of the constraint graph.
    pub fn shares_occurrence(&self, other: &JoinablePair) -> bool {
        let mine = self.occurrences();
        other.occurrences().iter().any(|o| mine.contains(o))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_canonical() {
        let a = IndexedAttribute::new(1, 0, 2);
        let b = IndexedAttribute::new(0, 1, 5);
        assert_eq!(JoinablePair::new(a, b), JoinablePair::new(b, a));
        assert_eq!(JoinablePair::new(a, b).lo(), b);
    }

    #[test]
    fn shares_occurrence_via_either_endpoint() {
        let p = JoinablePair::new(IndexedAttribute::new(0, 0, 0), IndexedAttribute::new(1, 0, 0));
        let q = JoinablePair::new(IndexedAttribute::new(1, 0, 1), IndexedAttribute::new(2, 0, 0));
        let r = JoinablePair::new(IndexedAttribute::new(2, 1, 0), IndexedAttribute::new(3, 0, 0));
        assert!(p.shares_occurrence(&q));
        assert!(!p.shares_occurrence(&r));
        // Different occurrence of the same table is a different node scope.
        assert!(!q.shares_occurrence(&r));
    }
}
