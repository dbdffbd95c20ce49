//! Discovery errors and non-fatal error collection.

use super::error_code::{self, ErrorCode};
use super::{ConfigError, StorageError};

/// Errors that stop a discovery session or phase before iteration starts.
/// Aggregates subsystem errors via `From` conversions.
///
/// The rule stream itself never raises mid-iteration for data-quality
/// issues; only session-setup failures appear here.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Discovery core used before init")]
    NotInitialized,

    #[error("Discovery cancelled")]
    Cancelled,
}

impl ErrorCode for DiscoveryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Storage(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::NotInitialized => error_code::NOT_INITIALIZED,
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}

/// Result of a multi-phase run that accumulates non-fatal errors.
/// Allows partial results to be returned even when some phases fail.
#[derive(Debug, Default)]
pub struct DiscoveryRunResult<T: Default = ()> {
    /// The successful result data.
    pub data: T,
    /// Non-fatal errors collected during the run.
    pub errors: Vec<DiscoveryError>,
}

impl<T: Default> DiscoveryRunResult<T> {
    /// Create a new result wrapping `data`.
    pub fn new(data: T) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    /// Add a non-fatal error to the result.
    pub fn add_error(&mut self, error: DiscoveryError) {
        self.errors.push(error);
    }

    /// Returns true if there are no non-fatal errors.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of non-fatal errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
