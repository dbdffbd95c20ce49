//! EventDispatcher — synchronous event dispatch with zero overhead when empty.

use std::sync::Arc;

use super::handler::DiscoveryEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
///
/// When no handlers are registered, `emit` iterates over an empty Vec —
/// effectively zero cost.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn DiscoveryEventHandler>>,
}

impl EventDispatcher {
    /// Create a new empty dispatcher.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register an event handler.
    pub fn register(&mut self, handler: Arc<dyn DiscoveryEventHandler>) {
        self.handlers.push(handler);
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Emit an event to all registered handlers.
    /// Handlers that panic are caught and do not prevent subsequent handlers
    /// from receiving the event.
    fn emit<F: Fn(&dyn DiscoveryEventHandler)>(&self, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::warn!("event handler panicked; continuing");
            }
        }
    }

    pub fn emit_phase_started(&self, event: &PhaseStartedEvent) {
        self.emit(|h| h.on_phase_started(event));
    }

    pub fn emit_candidate_progress(&self, event: &CandidateProgressEvent) {
        self.emit(|h| h.on_candidate_progress(event));
    }

    pub fn emit_rule_discovered(&self, event: &RuleDiscoveredEvent) {
        self.emit(|h| h.on_rule_discovered(event));
    }

    pub fn emit_checkpoint_written(&self, event: &CheckpointWrittenEvent) {
        self.emit(|h| h.on_checkpoint_written(event));
    }

    pub fn emit_phase_complete(&self, event: &PhaseCompleteEvent) {
        self.emit(|h| h.on_phase_complete(event));
    }

    pub fn emit_error(&self, event: &ErrorEvent) {
        self.emit(|h| h.on_error(event));
    }
}
