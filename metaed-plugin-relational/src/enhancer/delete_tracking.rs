use metaed_core::{V5_4_OR_GREATER, satisfies};
use metaed_pipeline::{Enhancer, EnhancerResult, MetaEdEnvironment};
use tracing::debug;

use crate::technology::{DeleteTracking, DeleteTrackingStyle, PhysicalColumn, PhysicalTable, Technology};

/// Describes the tables and triggers that record deletes of aggregate roots.
///
/// Targets of 5.4.0 and later use change-query tracking
/// (`tracked_changes_{schema}`, `{Table}_TR_DeleteTracking`); earlier targets
/// use `tracked_deletes_{schema}` with schema-prefixed trigger names.
pub struct DeleteTrackingEnhancer {
    technology: Technology,
}

impl DeleteTrackingEnhancer {
    pub fn new(technology: Technology) -> Self {
        Self { technology }
    }

    fn tracking(&self, style: DeleteTrackingStyle, table: &PhysicalTable) -> DeleteTracking {
        let technology = self.technology;
        let source_schema = technology.identifier(&[table.key.schema.as_str()]);
        let trigger_name = match style {
            DeleteTrackingStyle::TrackedChanges => technology.identifier(&[table.key.table_id.as_str(), "TR_DeleteTracking"]),
            DeleteTrackingStyle::TrackedDeletes => {
                technology.identifier(&[table.key.schema.as_str(), table.key.table_id.as_str(), "TR_DeleteTracking"])
            }
        };
        let columns = table
            .primary_key_columns()
            .map(|column| match style {
                DeleteTrackingStyle::TrackedChanges => PhysicalColumn {
                    name: technology.identifier(&[format!("Old{}", column.column_id)]),
                    ..column.clone()
                },
                DeleteTrackingStyle::TrackedDeletes => column.clone(),
            })
            .collect();

        DeleteTracking {
            style,
            schema: format!("{}{}", style.schema_prefix(), table.key.schema),
            table_name: table.name.clone(),
            source_schema,
            source_table: table.name.clone(),
            trigger_name,
            columns,
        }
    }
}

impl Enhancer for DeleteTrackingEnhancer {
    fn name(&self) -> &'static str {
        "DeleteTrackingEnhancer"
    }

    fn enhance(&self, environment: &mut MetaEdEnvironment) -> EnhancerResult {
        let version = environment.target_technology_version(self.technology.plugin_id());
        let style = if satisfies(&version, V5_4_OR_GREATER) {
            DeleteTrackingStyle::TrackedChanges
        } else {
            DeleteTrackingStyle::TrackedDeletes
        };

        let names = environment.repository.namespace_names();
        for name in names {
            let Some(namespace) = environment.repository.namespace_mut(&name) else {
                continue;
            };
            if self.technology.database(&namespace.data).is_none() {
                continue;
            }
            let database = self.technology.database_mut(&mut namespace.data);
            database.delete_tracking = database
                .tables
                .iter()
                .filter(|table| table.is_aggregate_root)
                .map(|table| self.tracking(style, table))
                .collect();
            debug!(
                namespace = %name,
                %version,
                ?style,
                tracked = database.delete_tracking.len(),
                "delete tracking derived"
            );
        }
        EnhancerResult::ok(self.name())
    }
}

#[cfg(test)]
mod tests {
    use metaed_core::SemVer;
    use metaed_model::{ModelBuilder, PluginId, PropertyKind, resolve_references};

    use super::*;
    use crate::enhancer::{DatabaseNamingEnhancer, ForeignKeyEnhancer, MainTableEnhancer};

    fn tracked(version: SemVer) -> Vec<String> {
        let mut repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .domain_entity("Student")
            .identity(PropertyKind::String, "StudentUniqueId")
            .collection(PropertyKind::String, "Nickname")
            .build()
            .unwrap();
        resolve_references(&mut repository);
        let mut environment = MetaEdEnvironment::new(repository, SemVer::new(5, 0, 0))
            .with_plugin_version(PluginId::EdfiOdsSqlServer, version);
        assert!(MainTableEnhancer.enhance(&mut environment).success);
        assert!(ForeignKeyEnhancer.enhance(&mut environment).success);
        assert!(DatabaseNamingEnhancer::new(Technology::SqlServer).enhance(&mut environment).success);
        assert!(DeleteTrackingEnhancer::new(Technology::SqlServer).enhance(&mut environment).success);

        let namespace = environment.repository.namespace("EdFi").unwrap();
        Technology::SqlServer
            .database(&namespace.data)
            .unwrap()
            .delete_tracking
            .iter()
            .map(|t| {
                let columns: Vec<&str> = t.columns.iter().map(|c| c.name.as_str()).collect();
                format!("{}.{} {} ({})", t.schema, t.table_name, t.trigger_name, columns.join(", "))
            })
            .collect()
    }

    #[test]
    fn test_change_queries_from_5_4() {
        insta::assert_debug_snapshot!(tracked(SemVer::new(5, 4, 0)), @r#"
        [
            "tracked_changes_edfi.Student Student_TR_DeleteTracking (OldStudentUniqueId)",
        ]
        "#);
    }

    #[test]
    fn test_tracked_deletes_before_5_4() {
        insta::assert_debug_snapshot!(tracked(SemVer::new(5, 3, 9)), @r#"
        [
            "tracked_deletes_edfi.Student edfi_Student_TR_DeleteTracking (StudentUniqueId)",
        ]
        "#);
    }
}
