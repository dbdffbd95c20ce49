//! SQLite implementation of the `RelationalStore` seam.
//!
//! Everything the discovery engine asks of the data lives here: schema
//! introspection, existence probes, and aggregate counts over multi-way
//! self-joins with per-occurrence aliases. No joined tuples are ever
//! materialized back to the caller.

pub mod connection;
pub mod sql;
pub mod store;

pub use connection::open_connection;
pub use store::SqliteStore;
