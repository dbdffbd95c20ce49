//! Event payload types for the discovery lifecycle.

use std::path::PathBuf;

/// Payload for `on_phase_started`.
#[derive(Debug, Clone)]
pub struct PhaseStartedEvent {
    pub kind: String,
    pub node_count: usize,
    pub edge_count: usize,
}

/// Payload for `on_candidate_progress`. Emitted on a fixed candidate-count
/// interval, not per candidate.
#[derive(Debug, Clone)]
pub struct CandidateProgressEvent {
    pub kind: String,
    pub candidates_seen: u64,
    pub rules_emitted: u64,
}

/// Payload for `on_rule_discovered`.
#[derive(Debug, Clone)]
pub struct RuleDiscoveredEvent {
    pub kind: String,
    pub display: String,
    pub support: f64,
    pub confidence: f64,
}

/// Payload for `on_checkpoint_written`.
#[derive(Debug, Clone)]
pub struct CheckpointWrittenEvent {
    pub path: PathBuf,
    pub rule_count: u64,
}

/// Payload for `on_phase_complete`.
#[derive(Debug, Clone)]
pub struct PhaseCompleteEvent {
    pub kind: String,
    pub candidates: u64,
    pub rules: u64,
    pub duration_ms: u64,
}

/// Payload for `on_error`.
#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub code: String,
    pub message: String,
}
