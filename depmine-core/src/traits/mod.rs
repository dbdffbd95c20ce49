//! Traits at the seams: cancellation and the relational store interface.

pub mod cancellation;
pub mod store;

pub use cancellation::{Cancellable, CancellationToken};
pub use store::RelationalStore;
