//! Core types, traits, errors, configuration, and events for depmine.
//!
//! Everything here is shared between the storage layer and the discovery
//! engine: the narrow `RelationalStore` seam, the per-subsystem error
//! enums, the typed configuration, and the synchronous event dispatcher.

pub mod config;
pub mod errors;
pub mod events;
pub mod tracing;
pub mod traits;
pub mod types;
