//! Relational model derived from MetaEd entities.
//!
//! Tables are technology neutral: ids and name components only. The
//! PostgreSQL and SQL Server plugins turn them into physical identifiers.

use metaed_model::{EntityId, PluginId, PluginSlot, PropertyKind, PropertyRef};
use serde::Serialize;

/// Logical column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    Boolean,
    Currency,
    Date,
    Datetime,
    Decimal,
    Duration,
    Integer,
    Percent,
    Short,
    String,
    Time,
    Year,
}

impl ColumnType {
    /// Type of the column a scalar property maps to. `None` for properties
    /// that expand into other columns or tables.
    pub fn for_property(kind: PropertyKind) -> Option<Self> {
        Some(match kind {
            PropertyKind::Boolean => ColumnType::Boolean,
            PropertyKind::Currency => ColumnType::Currency,
            PropertyKind::Date => ColumnType::Date,
            PropertyKind::Datetime => ColumnType::Datetime,
            PropertyKind::Decimal | PropertyKind::SharedDecimal => ColumnType::Decimal,
            PropertyKind::Duration => ColumnType::Duration,
            PropertyKind::Integer
            | PropertyKind::SharedInteger
            | PropertyKind::Descriptor
            | PropertyKind::Enumeration => ColumnType::Integer,
            PropertyKind::Percent => ColumnType::Percent,
            PropertyKind::Short | PropertyKind::SharedShort | PropertyKind::SchoolYearEnumeration => {
                ColumnType::Short
            }
            PropertyKind::String | PropertyKind::SharedString => ColumnType::String,
            PropertyKind::Time => ColumnType::Time,
            PropertyKind::Year => ColumnType::Year,
            PropertyKind::Association
            | PropertyKind::Choice
            | PropertyKind::Common
            | PropertyKind::DomainEntity
            | PropertyKind::InlineCommon => return None,
        })
    }
}

/// Where a column's value comes from when it mirrors a column of another table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSource {
    /// The reference property that brought the column in. `None` for the
    /// link from a child, subclass, or extension table to its parent.
    pub via: Option<PropertyRef>,
    pub foreign_column_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Logical name, independent of any database naming rules
    pub column_id: String,
    pub column_type: ColumnType,
    pub is_nullable: bool,
    pub is_part_of_primary_key: bool,
    /// Dot separated property path that produced this column
    pub property_path: String,
    /// More than one source means the column was merged
    pub sources: Vec<ColumnSource>,
}

impl Column {
    pub fn new(column_id: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            column_id: column_id.into(),
            column_type,
            is_nullable: false,
            is_part_of_primary_key: false,
            property_path: String::new(),
            sources: Vec::new(),
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_part_of_primary_key = true;
        self.is_nullable = false;
        self
    }

    pub fn nullable(mut self, is_nullable: bool) -> Self {
        self.is_nullable = is_nullable && !self.is_part_of_primary_key;
        self
    }

    pub fn path(mut self, property_path: impl Into<String>) -> Self {
        self.property_path = property_path.into();
        self
    }

    pub fn source(mut self, via: Option<PropertyRef>, foreign_column_id: impl Into<String>) -> Self {
        self.sources.push(ColumnSource {
            via,
            foreign_column_id: foreign_column_id.into(),
        });
        self
    }

    pub fn is_sourced_from(&self, via: Option<PropertyRef>, foreign_column_id: &str) -> bool {
        self.sources
            .iter()
            .any(|s| s.via == via && s.foreign_column_id == foreign_column_id)
    }
}

/// Schema-qualified table handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableKey {
    pub schema: String,
    pub table_id: String,
}

impl TableKey {
    pub fn new(schema: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table_id: table_id.into(),
        }
    }
}

/// Why a table exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TableKind {
    /// The root table of a top level entity
    Main,
    Subclass,
    Extension,
    /// A collection or common property of a parent table
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnPair {
    pub parent_column_id: String,
    pub foreign_column_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub foreign_table: TableKey,
    pub via: Option<PropertyRef>,
    pub column_pairs: Vec<ColumnPair>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub key: TableKey,
    pub kind: TableKind,
    /// Name components the table id was assembled from
    pub name_components: Vec<String>,
    pub parent_entity: EntityId,
    /// Table a child, subclass, or extension table hangs off
    pub parent_table: Option<TableKey>,
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKey>,
    pub is_aggregate_root: bool,
}

impl Table {
    pub fn table_id(&self) -> &str {
        &self.key.table_id
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.column_id == column_id)
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_part_of_primary_key)
    }

    /// Add a column, merging it into an existing column of the same id.
    pub fn add_column(&mut self, column: Column) {
        match self.columns.iter_mut().find(|c| c.column_id == column.column_id) {
            Some(existing) => {
                existing.is_part_of_primary_key |= column.is_part_of_primary_key;
                existing.is_nullable &= column.is_nullable;
                existing.sources.extend(column.sources);
            }
            None => self.columns.push(column),
        }
    }
}

/// Tables of one namespace, in creation order.
#[derive(Debug, Default)]
pub struct RelationalNamespace {
    pub tables: Vec<Table>,
}

impl PluginSlot for RelationalNamespace {
    const PLUGIN: PluginId = PluginId::EdfiOdsRelational;
}

impl RelationalNamespace {
    pub fn table(&self, table_id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.table_id() == table_id)
    }
}

#[derive(Debug, Default)]
pub struct RelationalEntity {
    pub main_table: Option<TableKey>,
}

impl PluginSlot for RelationalEntity {
    const PLUGIN: PluginId = PluginId::EdfiOdsRelational;
}

#[cfg(test)]
mod tests {
    use metaed_model::ModelBuilder;

    use super::*;

    #[test]
    fn test_add_column_merges_same_id() {
        let repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .association("StudentSectionAssociation")
            .build()
            .unwrap();
        let mut table = Table {
            key: TableKey::new("edfi", "StudentSectionAssociation"),
            kind: TableKind::Main,
            name_components: vec!["StudentSectionAssociation".into()],
            parent_entity: repository.entity_ids().next().unwrap(),
            parent_table: None,
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            is_aggregate_root: true,
        };
        table.add_column(Column::new("SchoolId", ColumnType::Integer).primary_key().source(None, "SchoolId"));
        table.add_column(Column::new("SchoolId", ColumnType::Integer).nullable(true).source(None, "Other"));

        assert_eq!(table.columns.len(), 1);
        let column = table.column("SchoolId").unwrap();
        assert!(column.is_part_of_primary_key);
        assert!(!column.is_nullable);
        assert!(column.is_sourced_from(None, "Other"));
    }

    #[test]
    fn test_scalar_column_types() {
        assert_eq!(ColumnType::for_property(PropertyKind::SharedString), Some(ColumnType::String));
        assert_eq!(ColumnType::for_property(PropertyKind::Descriptor), Some(ColumnType::Integer));
        assert_eq!(ColumnType::for_property(PropertyKind::Common), None);
    }
}
