//! Shared value types: fast-hash collections, schema descriptors,
//! dependency kinds, and compatibility modes.

pub mod collections;
pub mod kind;
pub mod schema;

pub use kind::{CompatibilityMode, DependencyKind};
pub use schema::{ColumnInfo, JoinPredicate, PredicateOp, QualifiedColumn, ScopedColumn};
