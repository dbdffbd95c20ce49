//! Joinability oracle.
//!
//! Decides whether two attributes are worth connecting in the search space.
//! Each discovery kind runs under one [`CompatibilityMode`]; the oracle
//! evaluates that mode against schema metadata and cheap aggregate queries.

use depmine_core::config::DiscoveryConfig;
use depmine_core::errors::StorageError;
use depmine_core::traits::RelationalStore;
use depmine_core::types::kind::CompatibilityMode;
use depmine_core::types::schema::QualifiedColumn;

use crate::identity::Attribute;

/// Thresholds the data-driven modes compare against.
#[derive(Debug, Clone, Copy)]
pub struct OracleConfig {
    pub overlap_floor: f64,
    pub uniqueness_floor: f64,
    pub cardinality_band: f64,
    pub sample_limit: u64,
}

impl OracleConfig {
    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self {
            overlap_floor: config.overlap_floor,
            uniqueness_floor: config.uniqueness_floor,
            cardinality_band: config.cardinality_band,
            sample_limit: config.sample_limit,
        }
    }
}

pub struct Oracle {
    mode: CompatibilityMode,
    config: OracleConfig,
}

impl Oracle {
    pub fn new(mode: CompatibilityMode, config: OracleConfig) -> Self {
        Self { mode, config }
    }

    pub fn mode(&self) -> CompatibilityMode {
        self.mode
    }

    /// Evaluates the configured mode for one attribute pair. Query errors
    /// propagate; callers building a search space treat them as "skip this
    /// pair" and log.
    pub fn is_compatible(
        &self,
        store: &dyn RelationalStore,
        left: &Attribute,
        right: &Attribute,
    ) -> Result<bool, StorageError> {
        match self.mode {
            CompatibilityMode::ForeignKeyOnly => self.foreign_key(store, left, right),
            CompatibilityMode::ValueOverlap => self.value_overlap(store, left, right),
            CompatibilityMode::Hybrid => Ok(self.foreign_key(store, left, right)?
                || self.value_overlap(store, left, right)?),
            CompatibilityMode::SemanticNameMatch => Ok(semantic_match(left, right)),
            CompatibilityMode::CardinalityRatio => self.cardinality_ratio(store, left, right),
            CompatibilityMode::UniquenessRatio => self.uniqueness_ratio(store, left, right),
            CompatibilityMode::KeyCandidate => self.key_candidate(store, left, right),
            CompatibilityMode::EqualitySample => self.equality_sample(store, left, right),
        }
    }

    /// One side is a key (declared or fully unique) and the other side's
    /// values are all contained in it.
    fn foreign_key(
        &self,
        store: &dyn RelationalStore,
        left: &Attribute,
        right: &Attribute,
    ) -> Result<bool, StorageError> {
        for (referencing, referenced) in [(left, right), (right, left)] {
            if !referenced.is_key && !is_unique(store, referenced)? {
                continue;
            }
            let from = qualified(referencing);
            let to = qualified(referenced);
            if store.count_unmatched(&from, &to)? == 0 && store.value_overlap(&from, &to)? > 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn value_overlap(
        &self,
        store: &dyn RelationalStore,
        left: &Attribute,
        right: &Attribute,
    ) -> Result<bool, StorageError> {
        let shared = store.value_overlap(&qualified(left), &qualified(right))?;
        if shared == 0 {
            return Ok(false);
        }
        let dl = store.distinct_count(&left.table, &[&left.name])?;
        let dr = store.distinct_count(&right.table, &[&right.name])?;
        let smaller = dl.min(dr).max(1);
        Ok(shared as f64 / smaller as f64 >= self.config.overlap_floor)
    }

    /// Distinct cardinalities of the two sides are within the configured
    /// band of each other.
    fn cardinality_ratio(
        &self,
        store: &dyn RelationalStore,
        left: &Attribute,
        right: &Attribute,
    ) -> Result<bool, StorageError> {
        let dl = store.distinct_count(&left.table, &[&left.name])?;
        let dr = store.distinct_count(&right.table, &[&right.name])?;
        if dl == 0 || dr == 0 {
            return Ok(false);
        }
        let ratio = dl.min(dr) as f64 / dl.max(dr) as f64;
        Ok(ratio >= 1.0 - self.config.cardinality_band)
    }

    fn uniqueness_ratio(
        &self,
        store: &dyn RelationalStore,
        left: &Attribute,
        right: &Attribute,
    ) -> Result<bool, StorageError> {
        Ok(uniqueness(store, left)? >= self.config.uniqueness_floor
            && uniqueness(store, right)? >= self.config.uniqueness_floor)
    }

    fn key_candidate(
        &self,
        store: &dyn RelationalStore,
        left: &Attribute,
        right: &Attribute,
    ) -> Result<bool, StorageError> {
        Ok(left.is_key
            || right.is_key
            || is_unique(store, left)?
            || is_unique(store, right)?)
    }

    /// Bounded equality probe: shared values relative to the capped distinct
    /// population of the smaller side.
    fn equality_sample(
        &self,
        store: &dyn RelationalStore,
        left: &Attribute,
        right: &Attribute,
    ) -> Result<bool, StorageError> {
        let shared = store.value_overlap(&qualified(left), &qualified(right))?;
        if shared == 0 {
            return Ok(false);
        }
        let dl = store.distinct_count(&left.table, &[&left.name])?;
        let dr = store.distinct_count(&right.table, &[&right.name])?;
        let population = dl.min(dr).min(self.config.sample_limit).max(1);
        Ok(shared.min(population) as f64 / population as f64 >= self.config.overlap_floor)
    }
}

fn qualified(attr: &Attribute) -> QualifiedColumn {
    QualifiedColumn {
        table: attr.table.clone(),
        column: attr.name.clone(),
    }
}

fn uniqueness(store: &dyn RelationalStore, attr: &Attribute) -> Result<f64, StorageError> {
    let rows = store.row_count(&attr.table)?;
    if rows == 0 {
        return Ok(0.0);
    }
    let distinct = store.distinct_count(&attr.table, &[&attr.name])?;
    Ok(distinct as f64 / rows as f64)
}

fn is_unique(store: &dyn RelationalStore, attr: &Attribute) -> Result<bool, StorageError> {
    Ok(uniqueness(store, attr)? >= 1.0)
}

/// Name-based match: equal names, or one name suffixed with the other the way
/// foreign keys are commonly spelled (`customer_id` vs `id`). Domains must
/// agree when both are declared.
fn semantic_match(left: &Attribute, right: &Attribute) -> bool {
    if let (Some(dl), Some(dr)) = (&left.domain, &right.domain) {
        if !dl.eq_ignore_ascii_case(dr) {
            return false;
        }
    }
    let l = left.name.to_ascii_lowercase();
    let r = right.name.to_ascii_lowercase();
    l == r || l.ends_with(&format!("_{r}")) || r.ends_with(&format!("_{l}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(table: &str, name: &str, domain: Option<&str>) -> Attribute {
        Attribute {
            table: table.into(),
            name: name.into(),
            domain: domain.map(Into::into),
            is_key: false,
        }
    }

    #[test]
    fn semantic_match_accepts_fk_suffix() {
        let id = attr("customers", "id", Some("INTEGER"));
        let fk = attr("orders", "customer_id", Some("INTEGER"));
        assert!(semantic_match(&id, &fk));
        assert!(semantic_match(&fk, &id));
    }

    #[test]
    fn semantic_match_rejects_domain_conflict() {
        let a = attr("t", "id", Some("INTEGER"));
        let b = attr("u", "id", Some("TEXT"));
        assert!(!semantic_match(&a, &b));
    }

    #[test]
    fn semantic_match_ignores_missing_domain() {
        let a = attr("t", "name", None);
        let b = attr("u", "name", Some("TEXT"));
        assert!(semantic_match(&a, &b));
    }
}
