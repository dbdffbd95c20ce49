//! Attribute identity: compact indices for tables, occurrences, and columns,
//! plus the canonical joinable-pair type that forms graph nodes.

mod attribute;
mod mapper;

pub use attribute::{Attribute, IndexedAttribute, JoinablePair};
pub use mapper::AttributeMapper;
