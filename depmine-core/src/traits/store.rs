//! The narrow relational store interface consumed by the discovery engine.

use crate::errors::StorageError;
use crate::types::{ColumnInfo, JoinPredicate, QualifiedColumn, ScopedColumn};

/// Query capabilities the discovery engine needs from a relational backend.
///
/// Everything is an aggregate or existence probe; the engine never
/// materializes joined tuples. `disjoint` semantics require occurrences of
/// the same table to bind distinct rows.
pub trait RelationalStore {
    /// List user tables, sorted for determinism.
    fn list_tables(&self) -> Result<Vec<String>, StorageError>;

    /// List the columns of one table, in schema order.
    fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>, StorageError>;

    /// Total row count of a table.
    fn row_count(&self, table: &str) -> Result<u64, StorageError>;

    /// Count of distinct value combinations over the given columns.
    fn distinct_count(&self, table: &str, columns: &[&str]) -> Result<u64, StorageError>;

    /// Does at least one tuple combination satisfy all predicates?
    /// `predicates` must be non-empty.
    fn exists_join(&self, predicates: &[JoinPredicate], disjoint: bool)
        -> Result<bool, StorageError>;

    /// Count tuple combinations satisfying all predicates. With
    /// `distinct_over`, count distinct projections onto those columns
    /// instead of raw combinations. `predicates` must be non-empty.
    fn count_join(
        &self,
        predicates: &[JoinPredicate],
        disjoint: bool,
        distinct_over: Option<&[ScopedColumn]>,
    ) -> Result<u64, StorageError>;

    /// Count rows of `left`'s table whose `left` value has no match in
    /// `right` (inclusion-dependency check; zero means containment).
    fn count_unmatched(
        &self,
        left: &QualifiedColumn,
        right: &QualifiedColumn,
    ) -> Result<u64, StorageError>;

    /// Count distinct `left` values that also appear as `right` values.
    fn value_overlap(
        &self,
        left: &QualifiedColumn,
        right: &QualifiedColumn,
    ) -> Result<u64, StorageError>;

    /// Request a supporting composite index. Best-effort: implementations
    /// log and swallow failures rather than raising.
    fn ensure_composite_index(&self, table: &str, columns: &[&str]) -> Result<(), StorageError>;
}
