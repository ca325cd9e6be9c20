use std::collections::HashMap;

use metaed_pipeline::{Enhancer, EnhancerResult, MetaEdEnvironment};
use tracing::debug;

use crate::{
    model::{ForeignKey, RelationalNamespace, Table},
    technology::{DatabaseNamespace, PhysicalColumn, PhysicalForeignKey, PhysicalTable, Technology},
};

/// Assigns physical table, column, and constraint names for one technology.
pub struct DatabaseNamingEnhancer {
    technology: Technology,
}

impl DatabaseNamingEnhancer {
    pub fn new(technology: Technology) -> Self {
        Self { technology }
    }

    fn physical_table(&self, environment: &MetaEdEnvironment, table: &Table) -> PhysicalTable {
        let technology = self.technology;
        let name = technology.table_name(&table.key);
        let columns = table
            .columns
            .iter()
            .map(|column| PhysicalColumn {
                column_id: column.column_id.clone(),
                name: technology.identifier(&[column.column_id.as_str()]),
                data_type: technology.data_type(column.column_type),
                is_nullable: column.is_nullable,
                is_part_of_primary_key: column.is_part_of_primary_key,
            })
            .collect();

        let mut used: HashMap<String, usize> = HashMap::new();
        let foreign_keys = table
            .foreign_keys
            .iter()
            .map(|fk| {
                let mut components = vec![
                    "FK".to_string(),
                    table.table_id().to_string(),
                    fk.foreign_table.table_id.clone(),
                ];
                if let Some(role) = role_name(environment, fk) {
                    components.push(role);
                }
                let count = used.entry(components.join("_")).or_default();
                *count += 1;
                if *count > 1 {
                    components.push(count.to_string());
                }
                PhysicalForeignKey {
                    name: technology.identifier(&components),
                    columns: fk
                        .column_pairs
                        .iter()
                        .map(|p| technology.identifier(&[p.parent_column_id.as_str()]))
                        .collect(),
                    foreign_schema: fk.foreign_table.schema.clone(),
                    foreign_table: technology.table_name(&fk.foreign_table),
                    foreign_columns: fk
                        .column_pairs
                        .iter()
                        .map(|p| technology.identifier(&[p.foreign_column_id.as_str()]))
                        .collect(),
                }
            })
            .collect();

        PhysicalTable {
            key: table.key.clone(),
            primary_key_name: technology.identifier(&[table.table_id(), "PK"]),
            name,
            is_aggregate_root: table.is_aggregate_root,
            columns,
            foreign_keys,
        }
    }
}

fn role_name(environment: &MetaEdEnvironment, fk: &ForeignKey) -> Option<String> {
    let property = environment.repository.property(fk.via?);
    (!property.role_name.is_empty()).then(|| property.role_name.clone())
}

impl Enhancer for DatabaseNamingEnhancer {
    fn name(&self) -> &'static str {
        match self.technology {
            Technology::Postgresql => "PostgresqlNamingEnhancer",
            Technology::SqlServer => "SqlServerNamingEnhancer",
        }
    }

    fn enhance(&self, environment: &mut MetaEdEnvironment) -> EnhancerResult {
        let mut named: Vec<(String, Vec<PhysicalTable>)> = Vec::new();
        for namespace in environment.repository.namespaces() {
            let Some(slot) = namespace.data.get::<RelationalNamespace>() else {
                continue;
            };
            let tables = slot
                .tables
                .iter()
                .map(|table| self.physical_table(environment, table))
                .collect();
            named.push((namespace.name.clone(), tables));
        }

        for (name, tables) in named {
            let Some(namespace) = environment.repository.namespace_mut(&name) else {
                continue;
            };
            debug!(namespace = %name, tables = tables.len(), technology = ?self.technology, "tables named");
            *self.technology.database_mut(&mut namespace.data) = DatabaseNamespace {
                tables,
                delete_tracking: Vec::new(),
            };
        }
        EnhancerResult::ok(self.name())
    }
}
