//! Error handling for depmine.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod discovery_error;
pub mod error_code;
pub mod storage_error;

pub use config_error::ConfigError;
pub use discovery_error::{DiscoveryError, DiscoveryRunResult};
pub use error_code::ErrorCode;
pub use storage_error::StorageError;
