use std::collections::HashMap;

use metaed_model::PropertyRef;
use metaed_pipeline::{Enhancer, EnhancerResult, MetaEdEnvironment};
use tracing::debug;

use crate::model::{ColumnPair, ForeignKey, RelationalEntity, RelationalNamespace, Table, TableKey};

/// Derives foreign keys from column sources.
///
/// Every primary key column of the referenced table must be matched by a
/// column of the referencing table. A missing match means the table model
/// is inconsistent and fails the compilation.
pub struct ForeignKeyEnhancer;

impl ForeignKeyEnhancer {
    fn foreign_keys(
        &self,
        environment: &MetaEdEnvironment,
        table: &Table,
        primary_keys: &HashMap<TableKey, Vec<String>>,
    ) -> Result<Vec<ForeignKey>, String> {
        let repository = &environment.repository;

        let mut vias: Vec<Option<PropertyRef>> = Vec::new();
        for source in table.columns.iter().flat_map(|c| &c.sources) {
            if !vias.contains(&source.via) {
                vias.push(source.via);
            }
        }

        let mut foreign_keys = Vec::new();
        for via in vias {
            let foreign_table = match via {
                None => table.parent_table.clone(),
                Some(property) => repository
                    .property(property)
                    .referenced_entity
                    .and_then(|entity| repository.entity(entity).data.get::<RelationalEntity>())
                    .and_then(|slot| slot.main_table.clone()),
            };
            let Some(foreign_table) = foreign_table else {
                continue;
            };
            let Some(foreign_columns) = primary_keys.get(&foreign_table) else {
                continue;
            };

            let mut column_pairs = Vec::new();
            for foreign_column_id in foreign_columns {
                let Some(column) = table.columns.iter().find(|c| c.is_sourced_from(via, foreign_column_id)) else {
                    return Err(format!(
                        "table '{}.{}' has no column for primary key column '{}' of '{}.{}'",
                        table.key.schema,
                        table.table_id(),
                        foreign_column_id,
                        foreign_table.schema,
                        foreign_table.table_id
                    ));
                };
                column_pairs.push(ColumnPair {
                    parent_column_id: column.column_id.clone(),
                    foreign_column_id: foreign_column_id.clone(),
                });
            }
            foreign_keys.push(ForeignKey {
                foreign_table,
                via,
                column_pairs,
            });
        }
        Ok(foreign_keys)
    }
}

impl Enhancer for ForeignKeyEnhancer {
    fn name(&self) -> &'static str {
        "ForeignKeyEnhancer"
    }

    fn enhance(&self, environment: &mut MetaEdEnvironment) -> EnhancerResult {
        let repository = &environment.repository;

        let mut primary_keys: HashMap<TableKey, Vec<String>> = HashMap::new();
        for namespace in repository.namespaces() {
            for table in namespace.data.get::<RelationalNamespace>().map(|s| s.tables.as_slice()).unwrap_or_default() {
                primary_keys.insert(
                    table.key.clone(),
                    table.primary_key_columns().map(|c| c.column_id.clone()).collect(),
                );
            }
        }

        let mut derived: Vec<(String, Vec<Vec<ForeignKey>>)> = Vec::new();
        for namespace in repository.namespaces() {
            let Some(slot) = namespace.data.get::<RelationalNamespace>() else {
                continue;
            };
            let mut per_table = Vec::with_capacity(slot.tables.len());
            for table in &slot.tables {
                match self.foreign_keys(environment, table, &primary_keys) {
                    Ok(foreign_keys) => per_table.push(foreign_keys),
                    Err(message) => return EnhancerResult::failed(self.name(), message),
                }
            }
            derived.push((namespace.name.clone(), per_table));
        }

        let mut count = 0usize;
        for (name, per_table) in derived {
            let Some(namespace) = environment.repository.namespace_mut(&name) else {
                continue;
            };
            let slot = namespace.data.get_or_default::<RelationalNamespace>();
            for (table, foreign_keys) in slot.tables.iter_mut().zip(per_table) {
                count += foreign_keys.len();
                table.foreign_keys = foreign_keys;
            }
        }
        debug!(foreign_keys = count, "foreign keys derived");
        EnhancerResult::ok(self.name())
    }
}

#[cfg(test)]
mod tests {
    use metaed_core::SemVer;
    use metaed_model::{ModelBuilder, PropertyDecl, PropertyKind, resolve_references};

    use super::*;
    use crate::enhancer::MainTableEnhancer;

    fn environment() -> MetaEdEnvironment {
        let mut repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .domain_entity("School")
            .identity(PropertyKind::Integer, "SchoolId")
            .domain_entity("Student")
            .identity(PropertyKind::String, "StudentUniqueId")
            .association("StudentSchoolAssociation")
            .identity(PropertyKind::DomainEntity, "Student")
            .identity(PropertyKind::DomainEntity, "School")
            .identity(PropertyKind::Date, "EntryDate")
            .domain_entity("Section")
            .identity(PropertyKind::DomainEntity, "School")
            .identity(PropertyKind::String, "SectionIdentifier")
            .association("StudentSectionAssociation")
            .property(
                PropertyDecl::new(PropertyKind::Association, "StudentSchoolAssociation")
                    .identity()
                    .merge("StudentSchoolAssociation.School", "Section.School"),
            )
            .identity(PropertyKind::DomainEntity, "Section")
            .build()
            .unwrap();
        resolve_references(&mut repository);
        let mut environment = MetaEdEnvironment::new(repository, SemVer::new(5, 0, 0));
        assert!(MainTableEnhancer.enhance(&mut environment).success);
        environment
    }

    fn table<'a>(environment: &'a MetaEdEnvironment, id: &str) -> &'a Table {
        environment
            .repository
            .namespace("EdFi")
            .and_then(|n| n.data.get::<RelationalNamespace>())
            .and_then(|s| s.table(id))
            .unwrap()
    }

    #[test]
    fn test_merged_column_serves_both_foreign_keys() {
        let mut environment = environment();
        assert!(ForeignKeyEnhancer.enhance(&mut environment).success);

        let association = table(&environment, "StudentSectionAssociation");
        let summary: Vec<String> = association
            .foreign_keys
            .iter()
            .map(|fk| {
                let pairs: Vec<String> = fk
                    .column_pairs
                    .iter()
                    .map(|p| format!("{}->{}", p.parent_column_id, p.foreign_column_id))
                    .collect();
                format!("{}: {}", fk.foreign_table.table_id, pairs.join(", "))
            })
            .collect();
        insta::assert_debug_snapshot!(summary, @r#"
        [
            "StudentSchoolAssociation: StudentUniqueId->StudentUniqueId, SchoolId->SchoolId, EntryDate->EntryDate",
            "Section: SchoolId->SchoolId, SectionIdentifier->SectionIdentifier",
        ]
        "#);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let mut environment = environment();
        let slot = environment
            .repository
            .namespace_mut("EdFi")
            .unwrap()
            .data
            .get_or_default::<RelationalNamespace>();
        let section = slot.tables.iter_mut().find(|t| t.table_id() == "Section").unwrap();
        section.columns.retain(|c| c.column_id != "SchoolId");

        let result = ForeignKeyEnhancer.enhance(&mut environment);
        assert!(!result.success);
        assert_eq!(
            result.failure_message.as_deref(),
            Some("table 'edfi.Section' has no column for primary key column 'SchoolId' of 'edfi.School'")
        );
    }
}
