//! Checkpoint persistence for resumable discovery.
//!
//! Checkpoints are advisory: loading or writing one never fails a run. A
//! missing or corrupt file logs and yields an empty seed.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use depmine_core::types::collections::FxHashSet;

use crate::stats::DiscoveryStats;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Structural hashes of every rule emitted so far, as hex strings.
    pub discovered_hashes: Vec<String>,
    pub rule_count: u64,
    pub stats: DiscoveryStats,
    /// Seconds since the Unix epoch at write time.
    pub timestamp: f64,
}

impl Checkpoint {
    pub fn from_hashes(hashes: &FxHashSet<u64>, rule_count: u64, stats: DiscoveryStats) -> Self {
        let mut discovered_hashes: Vec<String> =
            hashes.iter().map(|h| format!("{h:016x}")).collect();
        discovered_hashes.sort_unstable();
        Self {
            discovered_hashes,
            rule_count,
            stats,
            timestamp: now_timestamp(),
        }
    }

    /// Loads a checkpoint, returning `None` when the file is absent or
    /// unreadable.
    pub fn load(path: &Path) -> Option<Checkpoint> {
        if !path.exists() {
            return None;
        }
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Checkpoint>(&content) {
                Ok(checkpoint) => {
                    debug!(
                        path = %path.display(),
                        rules = checkpoint.rule_count,
                        "checkpoint loaded"
                    );
                    Some(checkpoint)
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "corrupt checkpoint ignored");
                    None
                }
            },
            Err(error) => {
                warn!(path = %path.display(), %error, "checkpoint unreadable, ignored");
                None
            }
        }
    }

    /// Best-effort write; failures are logged, never raised.
    pub fn write(&self, path: &Path) -> bool {
        let json = match serde_json::to_string_pretty(self) {
            Ok(json) => json,
            Err(error) => {
                warn!(%error, "checkpoint serialization failed");
                return false;
            }
        };
        if let Err(error) = fs::write(path, json) {
            warn!(path = %path.display(), %error, "checkpoint write failed");
            return false;
        }
        true
    }

    /// Parses the stored hex hashes, skipping malformed entries.
    pub fn hashes(&self) -> FxHashSet<u64> {
        self.discovered_hashes
            .iter()
            .filter_map(|h| u64::from_str_radix(h, 16).ok())
            .collect()
    }
}

pub(crate) fn now_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trip() {
        let mut set = FxHashSet::default();
        set.insert(42u64);
        set.insert(u64::MAX);
        let checkpoint = Checkpoint::from_hashes(&set, 2, DiscoveryStats::default());
        assert_eq!(checkpoint.hashes(), set);
    }

    #[test]
    fn malformed_hashes_are_skipped() {
        let checkpoint = Checkpoint {
            discovered_hashes: vec!["zzzz".into(), "ff".into()],
            ..Checkpoint::default()
        };
        let hashes = checkpoint.hashes();
        assert_eq!(hashes.len(), 1);
        assert!(hashes.contains(&0xff));
    }
}
