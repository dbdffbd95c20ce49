//! SQL construction for join probes.
//!
//! Every occurrence of a table gets its own alias (`"orders_o1"`), so one
//! candidate can reference the same table several times. Disjoint semantics
//! add pairwise rowid inequalities between occurrences of the same table.

use std::collections::BTreeSet;

use depmine_core::errors::StorageError;
use depmine_core::types::{JoinPredicate, PredicateOp, ScopedColumn};

/// Quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Alias for one table occurrence.
pub fn occurrence_alias(table: &str, occurrence: u32) -> String {
    format!("{table}_o{occurrence}")
}

fn scoped_ref(column: &ScopedColumn) -> String {
    format!(
        "{}.{}",
        quote_ident(&occurrence_alias(&column.table, column.occurrence)),
        quote_ident(&column.column)
    )
}

/// The distinct (table, occurrence) pairs referenced by a query, sorted.
fn collect_occurrences(
    predicates: &[JoinPredicate],
    distinct_over: Option<&[ScopedColumn]>,
) -> BTreeSet<(String, u32)> {
    let mut occurrences = BTreeSet::new();
    for pred in predicates {
        occurrences.insert((pred.left.table.clone(), pred.left.occurrence));
        occurrences.insert((pred.right.table.clone(), pred.right.occurrence));
    }
    if let Some(columns) = distinct_over {
        for col in columns {
            occurrences.insert((col.table.clone(), col.occurrence));
        }
    }
    occurrences
}

fn from_clause(occurrences: &BTreeSet<(String, u32)>) -> String {
    occurrences
        .iter()
        .map(|(table, occ)| {
            format!(
                "{} AS {}",
                quote_ident(table),
                quote_ident(&occurrence_alias(table, *occ))
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn where_clause(
    predicates: &[JoinPredicate],
    occurrences: &BTreeSet<(String, u32)>,
    disjoint: bool,
) -> String {
    let mut clauses: Vec<String> = predicates
        .iter()
        .map(|pred| {
            let op = match pred.op {
                PredicateOp::Eq => "=",
                PredicateOp::Ne => "<>",
            };
            format!("{} {op} {}", scoped_ref(&pred.left), scoped_ref(&pred.right))
        })
        .collect();

    if disjoint {
        // Same table, different occurrences: bind distinct rows.
        let occs: Vec<&(String, u32)> = occurrences.iter().collect();
        for i in 0..occs.len() {
            for j in (i + 1)..occs.len() {
                if occs[i].0 == occs[j].0 {
                    clauses.push(format!(
                        "{}.rowid <> {}.rowid",
                        quote_ident(&occurrence_alias(&occs[i].0, occs[i].1)),
                        quote_ident(&occurrence_alias(&occs[j].0, occs[j].1))
                    ));
                }
            }
        }
    }

    clauses.join(" AND ")
}

fn require_predicates(predicates: &[JoinPredicate]) -> Result<(), StorageError> {
    if predicates.is_empty() {
        return Err(StorageError::InvalidQuery {
            message: "join probe requires at least one predicate".to_string(),
        });
    }
    Ok(())
}

/// `SELECT EXISTS (SELECT 1 FROM … WHERE …)`.
pub fn exists_join_sql(predicates: &[JoinPredicate], disjoint: bool) -> Result<String, StorageError> {
    require_predicates(predicates)?;
    let occurrences = collect_occurrences(predicates, None);
    Ok(format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE {})",
        from_clause(&occurrences),
        where_clause(predicates, &occurrences, disjoint)
    ))
}

/// `SELECT COUNT(*) FROM … WHERE …`, optionally counting distinct
/// projections onto `distinct_over`.
pub fn count_join_sql(
    predicates: &[JoinPredicate],
    disjoint: bool,
    distinct_over: Option<&[ScopedColumn]>,
) -> Result<String, StorageError> {
    require_predicates(predicates)?;
    let occurrences = collect_occurrences(predicates, distinct_over);
    let from = from_clause(&occurrences);
    let filter = where_clause(predicates, &occurrences, disjoint);

    match distinct_over {
        Some(columns) if !columns.is_empty() => {
            let projection = columns
                .iter()
                .map(scoped_ref)
                .collect::<Vec<_>>()
                .join(", ");
            Ok(format!(
                "SELECT COUNT(*) FROM (SELECT DISTINCT {projection} FROM {from} WHERE {filter})"
            ))
        }
        _ => Ok(format!("SELECT COUNT(*) FROM {from} WHERE {filter}")),
    }
}

/// Count distinct value combinations over some columns of one table.
pub fn distinct_count_sql(table: &str, columns: &[&str]) -> Result<String, StorageError> {
    if columns.is_empty() {
        return Err(StorageError::InvalidQuery {
            message: "distinct count requires at least one column".to_string(),
        });
    }
    let projection = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!(
        "SELECT COUNT(*) FROM (SELECT DISTINCT {projection} FROM {})",
        quote_ident(table)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sc(table: &str, occ: u32, column: &str) -> ScopedColumn {
        ScopedColumn::new(table, occ, column)
    }

    #[test]
    fn exists_sql_aliases_occurrences() {
        let preds = [JoinPredicate::eq(sc("a", 0, "x"), sc("b", 0, "y"))];
        let sql = exists_join_sql(&preds, false).unwrap();
        assert!(sql.contains("\"a\" AS \"a_o0\""));
        assert!(sql.contains("\"a_o0\".\"x\" = \"b_o0\".\"y\""));
    }

    #[test]
    fn disjoint_adds_rowid_inequality_for_same_table() {
        let preds = [JoinPredicate::eq(sc("t", 0, "x"), sc("t", 1, "x"))];
        let sql = exists_join_sql(&preds, true).unwrap();
        assert!(sql.contains("\"t_o0\".rowid <> \"t_o1\".rowid"));
    }

    #[test]
    fn empty_predicates_rejected() {
        assert!(exists_join_sql(&[], false).is_err());
        assert!(count_join_sql(&[], false, None).is_err());
    }

    #[test]
    fn distinct_over_wraps_in_subquery() {
        let preds = [JoinPredicate::eq(sc("a", 0, "x"), sc("b", 0, "y"))];
        let over = [sc("a", 0, "x")];
        let sql = count_join_sql(&preds, false, Some(&over)).unwrap();
        assert!(sql.starts_with("SELECT COUNT(*) FROM (SELECT DISTINCT"));
    }
}
