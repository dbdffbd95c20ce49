//! Dependency kinds and attribute compatibility modes.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// The four supported dependency/rule shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Functional dependency: `T: X → Y`.
    Fd,
    /// Equality-generating dependency: body joins imply an equality.
    Egd,
    /// Tuple-generating dependency: body joins imply head joins exist.
    Tgd,
    /// Horn rule: body predicates imply exactly one head literal.
    Horn,
}

impl DependencyKind {
    /// Parse a kind name. Unknown kinds are fatal: there is no safe default.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name.to_ascii_lowercase().as_str() {
            "fd" => Ok(Self::Fd),
            "egd" => Ok(Self::Egd),
            "tgd" => Ok(Self::Tgd),
            "horn" => Ok(Self::Horn),
            other => Err(ConfigError::UnknownKind {
                kind: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fd => "fd",
            Self::Egd => "egd",
            Self::Tgd => "tgd",
            Self::Horn => "horn",
        }
    }

    /// All kinds, in canonical phase order.
    pub fn all() -> [DependencyKind; 4] {
        [Self::Fd, Self::Egd, Self::Tgd, Self::Horn]
    }
}

impl std::fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named strategy for judging whether two attributes are plausibly joinable.
///
/// The mode set is closed; each mode is evaluated from live data through the
/// store primitives (containment, overlap, distinct/row ratios) or from
/// schema metadata alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompatibilityMode {
    /// Containment in at least one direction: every value on one side
    /// exists on the other.
    ForeignKeyOnly,
    /// Shared values above the configured overlap floor.
    ValueOverlap,
    /// Foreign-key containment or value overlap.
    Hybrid,
    /// Equal column names (case-insensitive) and equal declared domains.
    SemanticNameMatch,
    /// Distinct-count ratio within the configured band.
    CardinalityRatio,
    /// Both sides nearly unique (distinct/rows above the uniqueness floor).
    UniquenessRatio,
    /// At least one side is a declared key or fully unique.
    KeyCandidate,
    /// Bounded-sample value equality check.
    EqualitySample,
}

impl CompatibilityMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "foreign-key-only" => Some(Self::ForeignKeyOnly),
            "value-overlap" => Some(Self::ValueOverlap),
            "hybrid" => Some(Self::Hybrid),
            "semantic-name-match" => Some(Self::SemanticNameMatch),
            "cardinality-ratio" => Some(Self::CardinalityRatio),
            "uniqueness-ratio" => Some(Self::UniquenessRatio),
            "key-candidate" => Some(Self::KeyCandidate),
            "equality-sample" => Some(Self::EqualitySample),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ForeignKeyOnly => "foreign-key-only",
            Self::ValueOverlap => "value-overlap",
            Self::Hybrid => "hybrid",
            Self::SemanticNameMatch => "semantic-name-match",
            Self::CardinalityRatio => "cardinality-ratio",
            Self::UniquenessRatio => "uniqueness-ratio",
            Self::KeyCandidate => "key-candidate",
            Self::EqualitySample => "equality-sample",
        }
    }
}

impl std::fmt::Display for CompatibilityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
