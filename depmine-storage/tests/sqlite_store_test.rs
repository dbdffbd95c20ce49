//! Integration tests for the SQLite store: introspection, join probes,
//! disjoint semantics, and containment counts.

use depmine_core::traits::RelationalStore;
use depmine_core::types::{JoinPredicate, QualifiedColumn, ScopedColumn};
use depmine_storage::SqliteStore;

fn setup_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .connection()
        .execute_batch(
            "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT);
             CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER, total REAL);
             INSERT INTO customers VALUES (1, 'ada'), (2, 'grace'), (3, 'edsger');
             INSERT INTO orders VALUES (10, 1, 9.5), (11, 1, 12.0), (12, 2, 3.25);",
        )
        .unwrap();
    store
}

fn sc(table: &str, occ: u32, column: &str) -> ScopedColumn {
    ScopedColumn::new(table, occ, column)
}

#[test]
fn test_list_tables_sorted() {
    let store = setup_store();
    let tables = store.list_tables().unwrap();
    assert_eq!(tables, vec!["customers".to_string(), "orders".to_string()]);
}

#[test]
fn test_list_columns_reports_keys_and_domains() {
    let store = setup_store();
    let columns = store.list_columns("customers").unwrap();
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].name, "id");
    assert!(columns[0].is_key);
    assert_eq!(columns[0].domain.as_deref(), Some("INTEGER"));
    assert!(!columns[1].is_key);
}

#[test]
fn test_unknown_table_is_an_error() {
    let store = setup_store();
    assert!(store.list_columns("missing").is_err());
}

#[test]
fn test_row_and_distinct_counts() {
    let store = setup_store();
    assert_eq!(store.row_count("orders").unwrap(), 3);
    assert_eq!(store.distinct_count("orders", &["customer_id"]).unwrap(), 2);
    assert_eq!(
        store
            .distinct_count("orders", &["customer_id", "total"])
            .unwrap(),
        3
    );
}

#[test]
fn test_exists_and_count_join() {
    let store = setup_store();
    let preds = [JoinPredicate::eq(
        sc("orders", 0, "customer_id"),
        sc("customers", 0, "id"),
    )];
    assert!(store.exists_join(&preds, false).unwrap());
    assert_eq!(store.count_join(&preds, false, None).unwrap(), 3);

    // Distinct over the order side: every order row has a match.
    let over = [sc("orders", 0, "id")];
    assert_eq!(store.count_join(&preds, false, Some(&over)).unwrap(), 3);
}

#[test]
fn test_disjoint_self_join() {
    let store = setup_store();
    // Two distinct orders by the same customer exist (10 and 11).
    let preds = [JoinPredicate::eq(
        sc("orders", 0, "customer_id"),
        sc("orders", 1, "customer_id"),
    )];
    assert!(store.exists_join(&preds, true).unwrap());

    // Without self-matches, only the (10, 11) pair agrees; both orders.
    assert_eq!(store.count_join(&preds, true, None).unwrap(), 2);
    // Non-disjoint counts include every row matching itself.
    assert_eq!(store.count_join(&preds, false, None).unwrap(), 5);
}

#[test]
fn test_count_unmatched_and_overlap() {
    let store = setup_store();
    let order_customer = QualifiedColumn::new("orders", "customer_id");
    let customer_id = QualifiedColumn::new("customers", "id");

    // Every order's customer exists: containment holds.
    assert_eq!(
        store.count_unmatched(&order_customer, &customer_id).unwrap(),
        0
    );
    // Customer 3 has no orders: reverse containment fails.
    assert_eq!(
        store.count_unmatched(&customer_id, &order_customer).unwrap(),
        1
    );
    assert_eq!(
        store.value_overlap(&order_customer, &customer_id).unwrap(),
        2
    );
}

#[test]
fn test_unmatched_ignores_nulls() {
    let store = setup_store();
    store
        .connection()
        .execute("INSERT INTO orders VALUES (13, NULL, 1.0)", [])
        .unwrap();
    let unmatched = store
        .count_unmatched(
            &QualifiedColumn::new("orders", "customer_id"),
            &QualifiedColumn::new("customers", "id"),
        )
        .unwrap();
    assert_eq!(unmatched, 0);
}

#[test]
fn test_ensure_composite_index_is_best_effort() {
    let store = setup_store();
    store
        .ensure_composite_index("orders", &["customer_id", "total"])
        .unwrap();
    // A second request is a no-op, not an error.
    store
        .ensure_composite_index("orders", &["customer_id", "total"])
        .unwrap();
    // A broken request must not raise either.
    store
        .ensure_composite_index("orders", &["no_such_column"])
        .unwrap();
}
