//! Connection pragmas for a read-heavy probe workload.

use depmine_core::errors::StorageError;
use rusqlite::Connection;

/// Apply pragmas. The store runs many small aggregate queries against an
/// existing database; WAL keeps concurrent readers cheap and the cache
/// sizing favors repeated joins over the same tables.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    // journal_mode returns a result row; query it instead of pragma_update.
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
        .map_err(|e| StorageError::Sqlite {
            message: format!("journal_mode: {e}"),
        })?;
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(|e| StorageError::Sqlite {
            message: format!("synchronous: {e}"),
        })?;
    conn.pragma_update(None, "temp_store", "MEMORY")
        .map_err(|e| StorageError::Sqlite {
            message: format!("temp_store: {e}"),
        })?;
    conn.pragma_update(None, "cache_size", -64000)
        .map_err(|e| StorageError::Sqlite {
            message: format!("cache_size: {e}"),
        })?;
    Ok(())
}
