//! Configuration errors.

use super::error_code::{self, ErrorCode};

/// Errors raised while loading or validating configuration.
///
/// An unknown dependency kind is fatal (no safe default exists); an unknown
/// traversal algorithm name is *not* an error — the engine falls back to
/// DFS with a warning.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid value for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Unknown dependency kind: {kind}")]
    UnknownKind { kind: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::FileNotFound { .. } => error_code::CONFIG_FILE_NOT_FOUND,
            Self::Parse { .. } => error_code::CONFIG_PARSE,
            Self::ValidationFailed { .. } => error_code::CONFIG_VALIDATION,
            Self::UnknownKind { .. } => error_code::UNKNOWN_KIND,
        }
    }
}
