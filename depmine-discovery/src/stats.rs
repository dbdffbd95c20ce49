//! Discovery run counters.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryStats {
    pub candidates: u64,
    pub splits_scored: u64,
    pub splits_accepted: u64,
    pub rules_emitted: u64,
    pub support_sum: f64,
    pub confidence_sum: f64,
}

impl DiscoveryStats {
    pub fn record_rule(&mut self, support: f64, confidence: f64) {
        self.rules_emitted += 1;
        self.support_sum += support;
        self.confidence_sum += confidence;
    }

    pub fn avg_support(&self) -> f64 {
        if self.rules_emitted == 0 {
            0.0
        } else {
            self.support_sum / self.rules_emitted as f64
        }
    }

    pub fn avg_confidence(&self) -> f64 {
        if self.rules_emitted == 0 {
            0.0
        } else {
            self.confidence_sum / self.rules_emitted as f64
        }
    }

    pub fn merge(&mut self, other: &DiscoveryStats) {
        self.candidates += other.candidates;
        self.splits_scored += other.splits_scored;
        self.splits_accepted += other.splits_accepted;
        self.rules_emitted += other.rules_emitted;
        self.support_sum += other.support_sum;
        self.confidence_sum += other.confidence_sum;
    }
}
