//! Stable string codes for every error variant.

pub const SQLITE: &str = "storage/sqlite";
pub const SCHEMA_ACCESS: &str = "storage/schema-access";
pub const UNKNOWN_TABLE: &str = "storage/unknown-table";
pub const INVALID_QUERY: &str = "storage/invalid-query";

pub const CONFIG_FILE_NOT_FOUND: &str = "config/file-not-found";
pub const CONFIG_PARSE: &str = "config/parse";
pub const CONFIG_VALIDATION: &str = "config/validation";
pub const UNKNOWN_KIND: &str = "config/unknown-kind";

pub const NOT_INITIALIZED: &str = "discovery/not-initialized";
pub const CANCELLED: &str = "discovery/cancelled";

/// Maps an error to a stable machine-readable code.
///
/// Codes are part of the external surface (logs, event payloads) and must
/// never change for an existing variant.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}
