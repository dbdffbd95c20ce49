//! Connection management: open, pragmas.

pub mod pragmas;

use std::path::Path;

use depmine_core::errors::StorageError;
use rusqlite::Connection;

use self::pragmas::apply_pragmas;

/// Open a database at the given path and apply read-workload pragmas.
pub fn open_connection(path: &Path) -> Result<Connection, StorageError> {
    let conn = Connection::open(path).map_err(|e| StorageError::SchemaAccess {
        message: format!("open {}: {e}", path.display()),
    })?;
    apply_pragmas(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing).
pub fn open_in_memory() -> Result<Connection, StorageError> {
    let conn = Connection::open_in_memory().map_err(|e| StorageError::SchemaAccess {
        message: format!("open in-memory: {e}"),
    })?;
    apply_pragmas(&conn)?;
    Ok(conn)
}
