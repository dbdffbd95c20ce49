//! `SqliteStore` — the `RelationalStore` implementation.

use std::path::Path;

use depmine_core::errors::StorageError;
use depmine_core::traits::RelationalStore;
use depmine_core::types::{ColumnInfo, JoinPredicate, QualifiedColumn, ScopedColumn};
use rusqlite::Connection;

use crate::connection;
use crate::sql;

/// SQLite-backed relational store.
///
/// Owns one connection; all trait methods are read-only aggregates except
/// `ensure_composite_index`, which is best-effort DDL.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a store over an existing database file.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Ok(Self {
            conn: connection::open_connection(path)?,
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self {
            conn: connection::open_in_memory()?,
        })
    }

    /// Wrap an already-configured connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Direct connection access, for fixtures and maintenance.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn query_count(&self, sql: &str) -> Result<u64, StorageError> {
        let mut stmt = self.conn.prepare_cached(sql).map_err(sqlite_err)?;
        let count: i64 = stmt.query_row([], |row| row.get(0)).map_err(sqlite_err)?;
        Ok(count.max(0) as u64)
    }
}

fn sqlite_err(e: rusqlite::Error) -> StorageError {
    StorageError::Sqlite {
        message: e.to_string(),
    }
}

impl RelationalStore for SqliteStore {
    fn list_tables(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .map_err(|e| StorageError::SchemaAccess {
                message: e.to_string(),
            })?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StorageError::SchemaAccess {
                message: e.to_string(),
            })?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::SchemaAccess {
                message: e.to_string(),
            })
    }

    fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>, StorageError> {
        let pragma = format!("PRAGMA table_info({})", sql::quote_ident(table));
        let mut stmt = self
            .conn
            .prepare(&pragma)
            .map_err(|e| StorageError::SchemaAccess {
                message: e.to_string(),
            })?;
        let rows = stmt
            .query_map([], |row| {
                let name: String = row.get(1)?;
                let declared: String = row.get::<_, Option<String>>(2)?.unwrap_or_default();
                let pk: i64 = row.get(5)?;
                Ok(ColumnInfo {
                    name,
                    domain: if declared.is_empty() {
                        None
                    } else {
                        Some(declared)
                    },
                    is_key: pk > 0,
                })
            })
            .map_err(|e| StorageError::SchemaAccess {
                message: e.to_string(),
            })?;
        let columns = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::SchemaAccess {
                message: e.to_string(),
            })?;
        if columns.is_empty() {
            return Err(StorageError::UnknownTable {
                table: table.to_string(),
            });
        }
        Ok(columns)
    }

    fn row_count(&self, table: &str) -> Result<u64, StorageError> {
        self.query_count(&format!(
            "SELECT COUNT(*) FROM {}",
            sql::quote_ident(table)
        ))
    }

    fn distinct_count(&self, table: &str, columns: &[&str]) -> Result<u64, StorageError> {
        self.query_count(&sql::distinct_count_sql(table, columns)?)
    }

    fn exists_join(
        &self,
        predicates: &[JoinPredicate],
        disjoint: bool,
    ) -> Result<bool, StorageError> {
        let query = sql::exists_join_sql(predicates, disjoint)?;
        let mut stmt = self.conn.prepare_cached(&query).map_err(sqlite_err)?;
        let exists: i64 = stmt.query_row([], |row| row.get(0)).map_err(sqlite_err)?;
        Ok(exists != 0)
    }

    fn count_join(
        &self,
        predicates: &[JoinPredicate],
        disjoint: bool,
        distinct_over: Option<&[ScopedColumn]>,
    ) -> Result<u64, StorageError> {
        self.query_count(&sql::count_join_sql(predicates, disjoint, distinct_over)?)
    }

    fn count_unmatched(
        &self,
        left: &QualifiedColumn,
        right: &QualifiedColumn,
    ) -> Result<u64, StorageError> {
        // NULLs on the left are neither matched nor unmatched.
        self.query_count(&format!(
            "SELECT COUNT(*) FROM {lt} l
             WHERE l.{lc} IS NOT NULL
               AND NOT EXISTS (SELECT 1 FROM {rt} r WHERE r.{rc} = l.{lc})",
            lt = sql::quote_ident(&left.table),
            lc = sql::quote_ident(&left.column),
            rt = sql::quote_ident(&right.table),
            rc = sql::quote_ident(&right.column),
        ))
    }

    fn value_overlap(
        &self,
        left: &QualifiedColumn,
        right: &QualifiedColumn,
    ) -> Result<u64, StorageError> {
        self.query_count(&format!(
            "SELECT COUNT(DISTINCT l.{lc}) FROM {lt} l
             WHERE EXISTS (SELECT 1 FROM {rt} r WHERE r.{rc} = l.{lc})",
            lt = sql::quote_ident(&left.table),
            lc = sql::quote_ident(&left.column),
            rt = sql::quote_ident(&right.table),
            rc = sql::quote_ident(&right.column),
        ))
    }

    fn ensure_composite_index(&self, table: &str, columns: &[&str]) -> Result<(), StorageError> {
        if columns.is_empty() {
            return Ok(());
        }
        let index_name = format!("idx_{table}_{}", columns.join("_")).replace(['"', ' '], "");
        let ddl = format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
            sql::quote_ident(&index_name),
            sql::quote_ident(table),
            columns
                .iter()
                .map(|c| sql::quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ")
        );
        if let Err(e) = self.conn.execute(&ddl, []) {
            tracing::warn!(table, index = %index_name, error = %e, "index creation failed; continuing");
        }
        Ok(())
    }
}
