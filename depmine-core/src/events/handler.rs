//! Event handler trait with no-op defaults.

use super::types::*;

/// Receives discovery lifecycle events.
///
/// Every method has a no-op default so handlers only implement what they
/// care about. Handlers must not block: dispatch is synchronous, on the
/// discovery thread.
pub trait DiscoveryEventHandler: Send + Sync {
    fn on_phase_started(&self, _event: &PhaseStartedEvent) {}
    fn on_candidate_progress(&self, _event: &CandidateProgressEvent) {}
    fn on_rule_discovered(&self, _event: &RuleDiscoveredEvent) {}
    fn on_checkpoint_written(&self, _event: &CheckpointWrittenEvent) {}
    fn on_phase_complete(&self, _event: &PhaseCompleteEvent) {}
    fn on_error(&self, _event: &ErrorEvent) {}
}
