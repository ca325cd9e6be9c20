//! Database technology specifics: identifier rules, type names, and the
//! per-technology physical model.

use metaed_model::{PluginData, PluginId, PluginSlot};
use serde::Serialize;

use crate::{
    model::{ColumnType, TableKey},
    naming::constrain_identifier,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Technology {
    Postgresql,
    SqlServer,
}

impl Technology {
    pub fn plugin_id(self) -> PluginId {
        match self {
            Technology::Postgresql => PluginId::EdfiOdsPostgresql,
            Technology::SqlServer => PluginId::EdfiOdsSqlServer,
        }
    }

    pub fn max_identifier_length(self) -> usize {
        match self {
            Technology::Postgresql => 63,
            Technology::SqlServer => 128,
        }
    }

    /// Folder generated artifacts are placed in.
    pub fn folder_name(self) -> &'static str {
        match self {
            Technology::Postgresql => "Database/PostgreSQL/ODS/Structure",
            Technology::SqlServer => "Database/SQLServer/ODS/Structure",
        }
    }

    /// Physical identifier for underscore-joined name components.
    ///
    /// PostgreSQL folds identifiers to lowercase; SQL Server keeps them verbatim.
    pub fn identifier<S: AsRef<str>>(self, components: &[S]) -> String {
        let name = constrain_identifier(components, "_", self.max_identifier_length());
        match self {
            Technology::Postgresql => name.to_lowercase(),
            Technology::SqlServer => name,
        }
    }

    pub fn table_name(self, key: &TableKey) -> String {
        self.identifier(&[key.table_id.as_str()])
    }

    /// `schema.table` as written in DDL.
    pub fn qualified(self, schema: &str, name: &str) -> String {
        format!("{}.{}", self.quote(schema), self.quote(name))
    }

    pub fn quote(self, identifier: &str) -> String {
        match self {
            Technology::Postgresql => identifier.to_string(),
            Technology::SqlServer => format!("[{identifier}]"),
        }
    }

    pub fn data_type(self, column_type: ColumnType) -> &'static str {
        match (self, column_type) {
            (Technology::Postgresql, ColumnType::Boolean) => "BOOLEAN",
            (Technology::Postgresql, ColumnType::Currency) => "MONEY",
            (Technology::Postgresql, ColumnType::Date) => "DATE",
            (Technology::Postgresql, ColumnType::Datetime) => "TIMESTAMP",
            (Technology::Postgresql, ColumnType::Decimal) => "DECIMAL(9, 4)",
            (Technology::Postgresql, ColumnType::Duration) => "VARCHAR(30)",
            (Technology::Postgresql, ColumnType::Integer) => "INT",
            (Technology::Postgresql, ColumnType::Percent) => "DECIMAL(5, 4)",
            (Technology::Postgresql, ColumnType::Short) => "SMALLINT",
            (Technology::Postgresql, ColumnType::String) => "VARCHAR(255)",
            (Technology::Postgresql, ColumnType::Time) => "TIME",
            (Technology::Postgresql, ColumnType::Year) => "SMALLINT",
            (Technology::SqlServer, ColumnType::Boolean) => "[BIT]",
            (Technology::SqlServer, ColumnType::Currency) => "[MONEY]",
            (Technology::SqlServer, ColumnType::Date) => "[DATE]",
            (Technology::SqlServer, ColumnType::Datetime) => "[DATETIME2](7)",
            (Technology::SqlServer, ColumnType::Decimal) => "[DECIMAL](9, 4)",
            (Technology::SqlServer, ColumnType::Duration) => "[NVARCHAR](30)",
            (Technology::SqlServer, ColumnType::Integer) => "[INT]",
            (Technology::SqlServer, ColumnType::Percent) => "[DECIMAL](5, 4)",
            (Technology::SqlServer, ColumnType::Short) => "[SMALLINT]",
            (Technology::SqlServer, ColumnType::String) => "[NVARCHAR](255)",
            (Technology::SqlServer, ColumnType::Time) => "[TIME](7)",
            (Technology::SqlServer, ColumnType::Year) => "[SMALLINT]",
        }
    }

    pub fn database(self, data: &PluginData) -> Option<&DatabaseNamespace> {
        match self {
            Technology::Postgresql => data.get::<PostgresqlNamespace>().map(|slot| &slot.0),
            Technology::SqlServer => data.get::<SqlServerNamespace>().map(|slot| &slot.0),
        }
    }

    pub fn database_mut(self, data: &mut PluginData) -> &mut DatabaseNamespace {
        match self {
            Technology::Postgresql => &mut data.get_or_default::<PostgresqlNamespace>().0,
            Technology::SqlServer => &mut data.get_or_default::<SqlServerNamespace>().0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalColumn {
    pub column_id: String,
    pub name: String,
    pub data_type: &'static str,
    pub is_nullable: bool,
    pub is_part_of_primary_key: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub foreign_schema: String,
    pub foreign_table: String,
    pub foreign_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalTable {
    pub key: TableKey,
    pub name: String,
    pub primary_key_name: String,
    pub is_aggregate_root: bool,
    pub columns: Vec<PhysicalColumn>,
    pub foreign_keys: Vec<PhysicalForeignKey>,
}

impl PhysicalTable {
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &PhysicalColumn> {
        self.columns.iter().filter(|c| c.is_part_of_primary_key)
    }
}

/// How deletes of aggregate roots are recorded for change queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DeleteTrackingStyle {
    /// `tracked_deletes_{schema}` tables, triggers prefixed by the schema
    TrackedDeletes,
    /// `tracked_changes_{schema}` tables (5.4 and later)
    TrackedChanges,
}

impl DeleteTrackingStyle {
    pub fn schema_prefix(self) -> &'static str {
        match self {
            DeleteTrackingStyle::TrackedDeletes => "tracked_deletes_",
            DeleteTrackingStyle::TrackedChanges => "tracked_changes_",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            DeleteTrackingStyle::TrackedDeletes => "0050-CreateTrackedDeleteTables.sql",
            DeleteTrackingStyle::TrackedChanges => "0200-CreateTrackedChangeTables.sql",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTracking {
    pub style: DeleteTrackingStyle,
    pub schema: String,
    pub table_name: String,
    pub source_schema: String,
    pub source_table: String,
    pub trigger_name: String,
    pub columns: Vec<PhysicalColumn>,
}

/// One technology's physical model of a namespace.
#[derive(Debug, Default)]
pub struct DatabaseNamespace {
    pub tables: Vec<PhysicalTable>,
    pub delete_tracking: Vec<DeleteTracking>,
}

#[derive(Debug, Default)]
pub struct PostgresqlNamespace(pub DatabaseNamespace);

impl PluginSlot for PostgresqlNamespace {
    const PLUGIN: PluginId = PluginId::EdfiOdsPostgresql;
}

#[derive(Debug, Default)]
pub struct SqlServerNamespace(pub DatabaseNamespace);

impl PluginSlot for SqlServerNamespace {
    const PLUGIN: PluginId = PluginId::EdfiOdsSqlServer;
}
