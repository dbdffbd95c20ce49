//! Discovery lifecycle events: payload types, handler trait, dispatcher.

pub mod dispatcher;
pub mod handler;
pub mod types;

pub use dispatcher::EventDispatcher;
pub use handler::DiscoveryEventHandler;
pub use types::{
    CandidateProgressEvent, CheckpointWrittenEvent, ErrorEvent, PhaseCompleteEvent,
    PhaseStartedEvent, RuleDiscoveredEvent,
};
