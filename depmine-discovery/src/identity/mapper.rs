//! Bidirectional mapping between store schema names and compact indices.

use depmine_core::errors::StorageError;
use depmine_core::traits::RelationalStore;
use depmine_core::types::collections::FxHashMap;
use depmine_core::types::schema::{QualifiedColumn, ScopedColumn};

use crate::identity::{Attribute, IndexedAttribute};

/// Snapshot of the store schema taken once per session.
///
/// All traversal and scoring code works with `u32` indices; the mapper is the
/// only place that resolves them back to names. Tables are kept in the order
/// the store lists them (sorted by name), so index assignment is
/// deterministic across runs.
#[derive(Debug, Clone)]
pub struct AttributeMapper {
    tables: Vec<String>,
    table_index: FxHashMap<String, u32>,
    attributes: Vec<Vec<Attribute>>,
    attribute_index: Vec<FxHashMap<String, u32>>,
    row_counts: Vec<u64>,
    distinct_counts: Vec<Vec<u64>>,
}

impl AttributeMapper {
    /// Reads the full schema (tables, columns, row and distinct counts) from
    /// the store.
    pub fn from_store(store: &dyn RelationalStore) -> Result<Self, StorageError> {
        let names = store.list_tables()?;
        let mut tables = Vec::with_capacity(names.len());
        let mut table_index = FxHashMap::default();
        let mut attributes = Vec::with_capacity(names.len());
        let mut attribute_index = Vec::with_capacity(names.len());
        let mut row_counts = Vec::with_capacity(names.len());
        let mut distinct_counts = Vec::with_capacity(names.len());

        for name in names {
            let columns = store.list_columns(&name)?;
            let rows = store.row_count(&name)?;
            let mut attrs = Vec::with_capacity(columns.len());
            let mut index = FxHashMap::default();
            let mut distinct = Vec::with_capacity(columns.len());
            for (i, column) in columns.into_iter().enumerate() {
                distinct.push(store.distinct_count(&name, &[&column.name])?);
                index.insert(column.name.clone(), i as u32);
                attrs.push(Attribute {
                    table: name.clone(),
                    name: column.name,
                    domain: column.domain,
                    is_key: column.is_key,
                });
            }
            table_index.insert(name.clone(), tables.len() as u32);
            tables.push(name);
            attributes.push(attrs);
            attribute_index.push(index);
            row_counts.push(rows);
            distinct_counts.push(distinct);
        }

        Ok(Self {
            tables,
            table_index,
            attributes,
            attribute_index,
            row_counts,
            distinct_counts,
        })
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn table_name(&self, table: u32) -> Option<&str> {
        self.tables.get(table as usize).map(String::as_str)
    }

    pub fn table_id(&self, name: &str) -> Option<u32> {
        self.table_index.get(name).copied()
    }

    pub fn attributes(&self, table: u32) -> &[Attribute] {
        self.attributes
            .get(table as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn attribute(&self, indexed: IndexedAttribute) -> Option<&Attribute> {
        self.attributes
            .get(indexed.table as usize)?
            .get(indexed.attribute as usize)
    }

    pub fn attribute_id(&self, table: u32, name: &str) -> Option<u32> {
        self.attribute_index.get(table as usize)?.get(name).copied()
    }

    pub fn column_count(&self, table: u32) -> usize {
        self.attributes
            .get(table as usize)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn row_count(&self, table: u32) -> u64 {
        self.row_counts.get(table as usize).copied().unwrap_or(0)
    }

    /// Distinct values of one column, as counted at snapshot time.
    pub fn distinct_count(&self, table: u32, attribute: u32) -> u64 {
        self.distinct_counts
            .get(table as usize)
            .and_then(|counts| counts.get(attribute as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Resolves an indexed attribute to the occurrence-scoped column the SQL
    /// layer understands.
    pub fn scoped(&self, indexed: IndexedAttribute) -> Option<ScopedColumn> {
        let attr = self.attribute(indexed)?;
        Some(ScopedColumn {
            table: attr.table.clone(),
            occurrence: indexed.occurrence,
            column: attr.name.clone(),
        })
    }

    /// Resolves an indexed attribute without the occurrence scope.
    pub fn qualified(&self, indexed: IndexedAttribute) -> Option<QualifiedColumn> {
        let attr = self.attribute(indexed)?;
        Some(QualifiedColumn {
            table: attr.table.clone(),
            column: attr.name.clone(),
        })
    }

    /// Human-readable `table#occurrence.column` form used in rule displays.
    pub fn display(&self, indexed: IndexedAttribute) -> String {
        match self.attribute(indexed) {
            Some(attr) => format!("{}#{}.{}", attr.table, indexed.occurrence, attr.name),
            None => format!("?{}#{}.?{}", indexed.table, indexed.occurrence, indexed.attribute),
        }
    }
}
