//! Discovery configuration with 3-layer resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::types::{CompatibilityMode, DependencyKind};

/// Per-kind compatibility mode selection, forwarded unchanged into each
/// strategy's init.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatibilityTable {
    pub fd: CompatibilityMode,
    pub egd: CompatibilityMode,
    pub tgd: CompatibilityMode,
    pub horn: CompatibilityMode,
}

impl Default for CompatibilityTable {
    fn default() -> Self {
        Self {
            fd: CompatibilityMode::SemanticNameMatch,
            egd: CompatibilityMode::Hybrid,
            tgd: CompatibilityMode::ForeignKeyOnly,
            horn: CompatibilityMode::ValueOverlap,
        }
    }
}

impl CompatibilityTable {
    pub fn mode_for(&self, kind: DependencyKind) -> CompatibilityMode {
        match kind {
            DependencyKind::Fd => self.fd,
            DependencyKind::Egd => self.egd,
            DependencyKind::Tgd => self.tgd,
            DependencyKind::Horn => self.horn,
        }
    }
}

/// Discovery configuration.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`DEPMINE_*`)
/// 2. Project config (`depmine.toml` in the project root)
/// 3. Compiled defaults
///
/// All quality thresholds live here: they are tunables, not derived law.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Maximum distinct table occurrences per candidate.
    pub max_table: usize,
    /// Maximum independent variables per candidate.
    pub max_vars: usize,
    /// Table occurrences considered when building the joinability graph.
    pub max_occurrence: u32,
    /// Traversal algorithm name ("dfs", "bfs", "astar"). Unknown names
    /// fall back to DFS with a warning.
    pub algorithm: String,
    /// Splits scoring below this floor on either support or confidence are
    /// rejected (a quality gate, not an error).
    pub low_quality_floor: f64,
    /// Minimum shared-value ratio for the value-overlap and hybrid modes.
    pub overlap_floor: f64,
    /// Minimum distinct/rows ratio for the uniqueness-ratio mode.
    pub uniqueness_floor: f64,
    /// Lower bound of the distinct-count ratio band for cardinality-ratio
    /// mode; the upper bound is its reciprocal.
    pub cardinality_band: f64,
    /// Rows inspected by the equality-sample mode.
    pub sample_limit: u64,
    /// Persist a checkpoint every N accepted rules. 0 disables.
    pub checkpoint_interval: u64,
    /// Log a stats snapshot every N candidates.
    pub snapshot_interval: u64,
    /// Drop structurally duplicate rules.
    pub dedup_enabled: bool,
    /// Checkpoint file location, if checkpointing is wanted.
    pub checkpoint_path: Option<PathBuf>,
    /// Ask the store for supporting composite indexes during init.
    pub request_indexes: bool,
    pub compatibility: CompatibilityTable,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_table: 3,
            max_vars: 8,
            max_occurrence: 2,
            algorithm: "dfs".to_string(),
            low_quality_floor: 0.01,
            overlap_floor: 0.1,
            uniqueness_floor: 0.9,
            cardinality_band: 0.5,
            sample_limit: 1000,
            checkpoint_interval: 50,
            snapshot_interval: 500,
            dedup_enabled: true,
            checkpoint_path: None,
            request_indexes: false,
            compatibility: CompatibilityTable::default(),
        }
    }
}

impl DiscoveryConfig {
    /// Load configuration with 3-layer resolution: defaults, then
    /// `depmine.toml` in `root`, then `DEPMINE_*` environment overrides.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_path = root.join("depmine.toml");
        if project_path.exists() {
            config = Self::from_toml_file(&project_path)?;
        }

        Self::apply_env_overrides(&mut config);
        Self::validate(&config)?;
        Ok(config)
    }

    /// Parse a config from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &DiscoveryConfig) -> Result<(), ConfigError> {
        if config.max_table == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "max_table".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if config.max_vars == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "max_vars".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if config.max_occurrence == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "max_occurrence".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        for (field, value) in [
            ("low_quality_floor", config.low_quality_floor),
            ("overlap_floor", config.overlap_floor),
            ("uniqueness_floor", config.uniqueness_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be between 0.0 and 1.0".to_string(),
                });
            }
        }
        if !(config.cardinality_band > 0.0 && config.cardinality_band <= 1.0) {
            return Err(ConfigError::ValidationFailed {
                field: "cardinality_band".to_string(),
                message: "must be in (0.0, 1.0]".to_string(),
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides.
    /// Pattern: `DEPMINE_MAX_TABLE`, `DEPMINE_ALGORITHM`, etc.
    fn apply_env_overrides(config: &mut DiscoveryConfig) {
        if let Ok(val) = std::env::var("DEPMINE_MAX_TABLE") {
            if let Ok(v) = val.parse::<usize>() {
                config.max_table = v;
            }
        }
        if let Ok(val) = std::env::var("DEPMINE_MAX_VARS") {
            if let Ok(v) = val.parse::<usize>() {
                config.max_vars = v;
            }
        }
        if let Ok(val) = std::env::var("DEPMINE_MAX_OCCURRENCE") {
            if let Ok(v) = val.parse::<u32>() {
                config.max_occurrence = v;
            }
        }
        if let Ok(val) = std::env::var("DEPMINE_ALGORITHM") {
            config.algorithm = val;
        }
        if let Ok(val) = std::env::var("DEPMINE_LOW_QUALITY_FLOOR") {
            if let Ok(v) = val.parse::<f64>() {
                config.low_quality_floor = v;
            }
        }
        if let Ok(val) = std::env::var("DEPMINE_CHECKPOINT_INTERVAL") {
            if let Ok(v) = val.parse::<u64>() {
                config.checkpoint_interval = v;
            }
        }
        if let Ok(val) = std::env::var("DEPMINE_DEDUP_ENABLED") {
            if let Ok(v) = val.parse::<bool>() {
                config.dedup_enabled = v;
            }
        }
        if let Ok(val) = std::env::var("DEPMINE_CHECKPOINT_PATH") {
            config.checkpoint_path = Some(PathBuf::from(val));
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}
