//! Discovered rules.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use depmine_core::types::kind::DependencyKind;

/// Payload shared by every rule kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCore {
    /// Body atoms, rendered as `table#occurrence.column [op] ...` strings.
    pub body: Vec<String>,
    /// Head atoms in the same rendering.
    pub head: Vec<String>,
    /// Joint satisfaction relative to the defining population, in `[0, 1]`.
    pub support: f64,
    /// Joint satisfaction relative to body-only satisfaction, in `[0, 1]`.
    pub confidence: f64,
    /// One-line human-readable rendering of the whole rule.
    pub display: String,
}

/// `body columns → head columns` within a single table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalDependency {
    #[serde(flatten)]
    pub core: RuleCore,
    pub table: String,
}

/// Equality-generating dependency: the body join forces `left = right`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EgdRule {
    #[serde(flatten)]
    pub core: RuleCore,
    pub left: String,
    pub right: String,
}

/// Tuple-generating dependency. `inclusion` marks the degenerate single-pair
/// form `a ⊆ b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TgdRule {
    #[serde(flatten)]
    pub core: RuleCore,
    pub inclusion: bool,
}

/// Horn rule with a single head literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HornRule {
    #[serde(flatten)]
    pub core: RuleCore,
}

/// Closed union of every rule kind the engine can emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Rule {
    Fd(FunctionalDependency),
    Egd(EgdRule),
    Tgd(TgdRule),
    Horn(HornRule),
}

impl Rule {
    pub fn kind(&self) -> DependencyKind {
        match self {
            Rule::Fd(_) => DependencyKind::Fd,
            Rule::Egd(_) => DependencyKind::Egd,
            Rule::Tgd(_) => DependencyKind::Tgd,
            Rule::Horn(_) => DependencyKind::Horn,
        }
    }

    pub fn core(&self) -> &RuleCore {
        match self {
            Rule::Fd(r) => &r.core,
            Rule::Egd(r) => &r.core,
            Rule::Tgd(r) => &r.core,
            Rule::Horn(r) => &r.core,
        }
    }

    pub fn support(&self) -> f64 {
        self.core().support
    }

    pub fn confidence(&self) -> f64 {
        self.core().confidence
    }

    pub fn display(&self) -> &str {
        &self.core().display
    }

    /// Order-insensitive identity over kind, body, and head. Two rules with
    /// the same atoms in a different discovery order hash identically.
    pub fn structural_hash(&self) -> u64 {
        let core = self.core();
        let mut body: Vec<&str> = core.body.iter().map(String::as_str).collect();
        let mut head: Vec<&str> = core.head.iter().map(String::as_str).collect();
        body.sort_unstable();
        head.sort_unstable();
        let mut buffer = String::from(self.kind().as_str());
        for atom in &body {
            buffer.push('\n');
            buffer.push_str(atom);
        }
        buffer.push_str("\n=>");
        for atom in &head {
            buffer.push('\n');
            buffer.push_str(atom);
        }
        xxh3_64(buffer.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horn(body: Vec<&str>, head: Vec<&str>) -> Rule {
        Rule::Horn(HornRule {
            core: RuleCore {
                body: body.into_iter().map(Into::into).collect(),
                head: head.into_iter().map(Into::into).collect(),
                support: 0.5,
                confidence: 0.9,
                display: String::new(),
            },
        })
    }

    #[test]
    fn structural_hash_ignores_atom_order() {
        let a = horn(vec!["p", "q"], vec!["r"]);
        let b = horn(vec!["q", "p"], vec!["r"]);
        assert_eq!(a.structural_hash(), b.structural_hash());
    }

    #[test]
    fn structural_hash_separates_body_and_head() {
        let a = horn(vec!["p", "q"], vec!["r"]);
        let b = horn(vec!["p"], vec!["q", "r"]);
        assert_ne!(a.structural_hash(), b.structural_hash());
    }
}
