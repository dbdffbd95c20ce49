//! Typed configuration, validated once at construction.

pub mod discovery_config;

pub use discovery_config::{CompatibilityTable, DiscoveryConfig};
