//! Schema descriptors and join-predicate value types.
//!
//! These are the wire types of the `RelationalStore` seam: the discovery
//! engine translates its indexed attribute pairs into `JoinPredicate`s and
//! the storage layer renders them as SQL.

use serde::{Deserialize, Serialize};

/// One column as reported by schema introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared type/domain, if the schema carries one.
    pub domain: Option<String>,
    /// Whether the column participates in the table's primary key.
    pub is_key: bool,
}

/// A (table, column) pair without an occurrence, for single-table probes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedColumn {
    pub table: String,
    pub column: String,
}

impl QualifiedColumn {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// A column scoped to one table occurrence.
///
/// The occurrence distinguishes multiple uses of the same table within one
/// candidate (a SQL alias, in storage terms).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopedColumn {
    pub table: String,
    pub occurrence: u32,
    pub column: String,
}

impl ScopedColumn {
    pub fn new(table: impl Into<String>, occurrence: u32, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            occurrence,
            column: column.into(),
        }
    }
}

/// Comparison operator of a join predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredicateOp {
    Eq,
    /// Inequality, used for violation counting of equality constraints.
    Ne,
}

/// One join predicate between two scoped columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinPredicate {
    pub left: ScopedColumn,
    pub right: ScopedColumn,
    pub op: PredicateOp,
}

impl JoinPredicate {
    pub fn eq(left: ScopedColumn, right: ScopedColumn) -> Self {
        Self {
            left,
            right,
            op: PredicateOp::Eq,
        }
    }

    pub fn ne(left: ScopedColumn, right: ScopedColumn) -> Self {
        Self {
            left,
            right,
            op: PredicateOp::Ne,
        }
    }
}
