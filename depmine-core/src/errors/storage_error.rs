//! Storage errors.

use super::error_code::{self, ErrorCode};

/// Errors raised by the relational store.
///
/// `SchemaAccess` is fatal to the phase whose `init` hit it; other phases
/// may still proceed. Feasibility-query failures are *not* surfaced through
/// this type by the engine: they are logged and treated as "infeasible".
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("Schema access failed: {message}")]
    SchemaAccess { message: String },

    #[error("Unknown table: {table}")]
    UnknownTable { table: String },

    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },
}

impl ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Sqlite { .. } => error_code::SQLITE,
            Self::SchemaAccess { .. } => error_code::SCHEMA_ACCESS,
            Self::UnknownTable { .. } => error_code::UNKNOWN_TABLE,
            Self::InvalidQuery { .. } => error_code::INVALID_QUERY,
        }
    }
}
