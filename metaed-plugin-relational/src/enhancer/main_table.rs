//! Table and column derivation.

use std::collections::HashSet;

use metaed_core::{V7_OR_GREATER, satisfies};
use metaed_model::{EntityId, EntityKind, Namespace, PluginId, PropertyKind, PropertyRef, Repository};
use metaed_pipeline::{Enhancer, EnhancerResult, MetaEdEnvironment};
use tracing::debug;

use crate::{
    model::{Column, ColumnType, RelationalEntity, RelationalNamespace, Table, TableKey, TableKind},
    naming::collapse_overlap,
};

/// Entity kinds that get tables, in table creation order within a namespace.
const TABLE_KINDS: [EntityKind; 8] = [
    EntityKind::AbstractEntity,
    EntityKind::DomainEntity,
    EntityKind::DomainEntitySubclass,
    EntityKind::Association,
    EntityKind::AssociationSubclass,
    EntityKind::Descriptor,
    EntityKind::DomainEntityExtension,
    EntityKind::AssociationExtension,
];

/// Schema of the tables of a namespace: `edfi` for core, the lowercased
/// project extension otherwise.
pub fn schema_for(namespace: &Namespace) -> String {
    if !namespace.is_extension {
        return "edfi".to_string();
    }
    if namespace.project_extension.is_empty() {
        namespace.name.to_lowercase()
    } else {
        namespace.project_extension.to_lowercase()
    }
}

/// Key of the main table of an entity, if entities of its kind have one.
pub fn main_table_key(repository: &Repository, entity: EntityId) -> Option<TableKey> {
    let entity = repository.entity(entity);
    let schema = schema_for(repository.namespace(&entity.namespace)?);
    let table_id = match entity.kind {
        EntityKind::AbstractEntity
        | EntityKind::DomainEntity
        | EntityKind::DomainEntitySubclass
        | EntityKind::Association
        | EntityKind::AssociationSubclass => entity.meta_ed_name.clone(),
        EntityKind::Descriptor => format!("{}Descriptor", entity.meta_ed_name),
        EntityKind::DomainEntityExtension | EntityKind::AssociationExtension => {
            format!("{}Extension", entity.meta_ed_name)
        }
        _ => return None,
    };
    Some(TableKey::new(schema, table_id))
}

/// Builds one main table per table-bearing entity, plus child tables for
/// collections and commons.
///
/// When the relational plugin targets 7.0 or later, non-key columns are
/// sorted by column id; earlier targets keep declaration order.
pub struct MainTableEnhancer;

impl Enhancer for MainTableEnhancer {
    fn name(&self) -> &'static str {
        "MainTableEnhancer"
    }

    fn enhance(&self, environment: &mut MetaEdEnvironment) -> EnhancerResult {
        let sort_columns = satisfies(
            &environment.target_technology_version(PluginId::EdfiOdsRelational),
            V7_OR_GREATER,
        );
        let repository = &environment.repository;

        let mut namespace_tables: Vec<(String, Vec<Table>)> = Vec::new();
        let mut main_tables: Vec<(EntityId, TableKey)> = Vec::new();
        for namespace in repository.namespaces() {
            let mut builder = TableBuilder {
                repository,
                schema: schema_for(namespace),
                tables: Vec::new(),
            };
            for entity in repository.entities_in(&namespace.name, &TABLE_KINDS) {
                if let Some(key) = builder.build_entity(entity) {
                    main_tables.push((entity, key));
                }
            }
            if sort_columns {
                builder.tables.iter_mut().for_each(sort_non_key_columns);
            }
            debug!(namespace = %namespace.name, tables = builder.tables.len(), "tables built");
            namespace_tables.push((namespace.name.clone(), builder.tables));
        }

        let repository = &mut environment.repository;
        for (name, tables) in namespace_tables {
            if let Some(namespace) = repository.namespace_mut(&name) {
                namespace.data.set(RelationalNamespace { tables });
            }
        }
        for (entity, key) in main_tables {
            repository.entity_mut(entity).data.get_or_default::<RelationalEntity>().main_table = Some(key);
        }
        EnhancerResult::ok(self.name())
    }
}

fn sort_non_key_columns(table: &mut Table) {
    let (mut keys, mut others): (Vec<Column>, Vec<Column>) =
        table.columns.drain(..).partition(|c| c.is_part_of_primary_key);
    others.sort_by(|a, b| a.column_id.cmp(&b.column_id));
    keys.append(&mut others);
    table.columns = keys;
}

struct TableBuilder<'r> {
    repository: &'r Repository,
    schema: String,
    tables: Vec<Table>,
}

impl TableBuilder<'_> {
    fn new_table(&self, table_id: String, kind: TableKind, entity: EntityId, parent: Option<TableKey>) -> Table {
        Table {
            key: TableKey::new(&self.schema, &table_id),
            kind,
            name_components: vec![table_id],
            parent_entity: entity,
            parent_table: parent,
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            is_aggregate_root: matches!(kind, TableKind::Main | TableKind::Subclass),
        }
    }

    fn build_entity(&mut self, id: EntityId) -> Option<TableKey> {
        let repository = self.repository;
        let entity = repository.entity(id);
        let key = main_table_key(repository, id)?;

        let mut table = match entity.kind {
            EntityKind::DomainEntitySubclass | EntityKind::AssociationSubclass => {
                let parent = entity.base_entity.and_then(|base| main_table_key(repository, base));
                let mut table = self.new_table(key.table_id.clone(), TableKind::Subclass, id, parent);
                for property in repository.identity_properties(id) {
                    for column in scalar_columns(repository, property, true, false, &mut HashSet::new()) {
                        let owner = repository.property(property);
                        let foreign = match (&owner.base_key_name, property.entity == id) {
                            (Some(base_key), true) => base_key.clone(),
                            _ => column.column_id.clone(),
                        };
                        table.add_column(relink_to_parent(column, foreign));
                    }
                }
                table
            }
            EntityKind::DomainEntityExtension | EntityKind::AssociationExtension => {
                if entity.properties.is_empty() {
                    return None;
                }
                let base = entity.base_entity?;
                let mut table =
                    self.new_table(key.table_id.clone(), TableKind::Extension, id, main_table_key(repository, base));
                for column in identity_columns(repository, base, &mut HashSet::new()) {
                    let foreign = column.column_id.clone();
                    table.add_column(relink_to_parent(column, foreign));
                }
                table
            }
            EntityKind::Descriptor => {
                let mut table = self.new_table(key.table_id.clone(), TableKind::Main, id, None);
                table.add_column(
                    Column::new(format!("{}DescriptorId", entity.meta_ed_name), ColumnType::Integer).primary_key(),
                );
                table
            }
            _ => {
                let mut table = self.new_table(key.table_id.clone(), TableKind::Main, id, None);
                let identity: Vec<PropertyRef> = entity
                    .own_identity_properties()
                    .map(|(index, _)| PropertyRef::new(id, index))
                    .collect();
                self.add_properties(&mut table, &identity, "", true, false);
                table
            }
        };

        let own: Vec<PropertyRef> = entity
            .properties
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_identity())
            .map(|(index, _)| PropertyRef::new(id, index))
            .collect();
        let children = self.add_properties(&mut table, &own, "", false, false);

        self.tables.push(table);
        self.tables.extend(children);
        Some(key)
    }

    /// Add columns for `properties` to `table`, returning the child tables
    /// their collections and commons need.
    fn add_properties(
        &self,
        table: &mut Table,
        properties: &[PropertyRef],
        prefix: &str,
        identity_allowed: bool,
        nullable: bool,
    ) -> Vec<Table> {
        let repository = self.repository;
        let mut children = Vec::new();
        for &property_ref in properties {
            let property = repository.property(property_ref);
            let is_key = identity_allowed && property.is_identity();
            let is_nullable = nullable || !property.is_required();

            if property.is_collection() || property.kind == PropertyKind::Common {
                children.extend(self.child_tables(table, property_ref, prefix));
                continue;
            }

            if matches!(property.kind, PropertyKind::InlineCommon | PropertyKind::Choice) {
                let Some(target) = property.referenced_entity else {
                    continue;
                };
                let inner_prefix = collapse_overlap(&[prefix, role_prefix(repository, property_ref)]);
                let inner = repository.all_properties(target);
                children.extend(self.add_properties(table, &inner, &inner_prefix, is_key, is_nullable));
                continue;
            }

            for column in scalar_columns(repository, property_ref, is_key, is_nullable, &mut HashSet::new()) {
                table.add_column(prefixed(column, prefix));
            }
        }
        children
    }

    fn child_tables(&self, parent: &Table, property_ref: PropertyRef, prefix: &str) -> Vec<Table> {
        let repository = self.repository;
        let property = repository.property(property_ref);
        let table_id = collapse_overlap(&[
            parent.table_id(),
            prefix,
            property.full_property_name().as_str(),
        ]);
        let mut child = self.new_table(table_id, TableKind::Child, parent.parent_entity, Some(parent.key.clone()));
        child.name_components = vec![parent.table_id().to_string(), property.full_property_name()];

        for column in parent.primary_key_columns() {
            child.add_column(
                Column::new(&column.column_id, column.column_type)
                    .primary_key()
                    .path(&column.property_path)
                    .source(None, &column.column_id),
            );
        }

        let mut grandchildren = Vec::new();
        if matches!(
            property.kind,
            PropertyKind::Common | PropertyKind::InlineCommon | PropertyKind::Choice
        ) {
            if let Some(target) = property.referenced_entity {
                let inner = repository.all_properties(target);
                grandchildren = self.add_properties(&mut child, &inner, "", true, false);
            }
        } else {
            for column in scalar_columns(repository, property_ref, true, false, &mut HashSet::new()) {
                child.add_column(column);
            }
        }

        let mut tables = vec![child];
        tables.extend(grandchildren);
        tables
    }
}

/// Role name of a property when it differs from the property's own name.
fn role_prefix(repository: &Repository, property_ref: PropertyRef) -> &str {
    let property = repository.property(property_ref);
    if property.has_role_name() && property.role_name != property.meta_ed_name {
        &property.role_name
    } else {
        ""
    }
}

fn prefixed(mut column: Column, prefix: &str) -> Column {
    if !prefix.is_empty() {
        column.column_id = collapse_overlap(&[prefix, column.column_id.as_str()]);
    }
    column
}

/// Make a copied identity column point back at the parent table instead of
/// wherever it originally came from.
fn relink_to_parent(mut column: Column, foreign_column_id: String) -> Column {
    column.sources.clear();
    column.is_part_of_primary_key = true;
    column.is_nullable = false;
    column.source(None, foreign_column_id)
}

/// Primary key columns an entity's identity contributes.
fn identity_columns(repository: &Repository, entity: EntityId, visiting: &mut HashSet<EntityId>) -> Vec<Column> {
    repository
        .identity_properties(entity)
        .into_iter()
        .flat_map(|property| scalar_columns(repository, property, true, false, visiting))
        .collect()
}

/// Columns for one non-collection property that lives in its parent's table.
fn scalar_columns(
    repository: &Repository,
    property_ref: PropertyRef,
    is_key: bool,
    is_nullable: bool,
    visiting: &mut HashSet<EntityId>,
) -> Vec<Column> {
    let property = repository.property(property_ref);
    let full_name = property.full_property_name();
    let finish = |column: Column| if is_key { column.primary_key() } else { column.nullable(is_nullable) };

    match property.kind {
        PropertyKind::DomainEntity | PropertyKind::Association => {
            let Some(target) = property.referenced_entity else {
                return Vec::new();
            };
            if !visiting.insert(target) {
                return Vec::new();
            }
            let foreign = identity_columns(repository, target, visiting);
            visiting.remove(&target);

            let role = role_prefix(repository, property_ref);
            foreign
                .into_iter()
                .map(|foreign_column| {
                    let column_id = collapse_overlap(&[role, foreign_column.column_id.as_str()]);
                    finish(
                        Column::new(column_id, foreign_column.column_type)
                            .path(format!("{full_name}.{}", foreign_column.property_path))
                            .source(Some(property_ref), foreign_column.column_id),
                    )
                })
                .collect()
        }
        PropertyKind::Descriptor => {
            let mut column = Column::new(format!("{full_name}DescriptorId"), ColumnType::Integer).path(&full_name);
            if let Some(target) = property.referenced_entity {
                let descriptor = &repository.entity(target).meta_ed_name;
                column = column.source(Some(property_ref), format!("{descriptor}DescriptorId"));
            }
            vec![finish(column)]
        }
        PropertyKind::Enumeration => {
            vec![finish(Column::new(format!("{full_name}TypeId"), ColumnType::Integer).path(&full_name))]
        }
        PropertyKind::SchoolYearEnumeration => {
            let column_id = collapse_overlap(&[role_prefix(repository, property_ref), "SchoolYear"]);
            vec![finish(Column::new(column_id, ColumnType::Short).path(&full_name))]
        }
        kind => match ColumnType::for_property(kind) {
            Some(column_type) => vec![finish(Column::new(&full_name, column_type).path(&full_name))],
            None => Vec::new(),
        },
    }
}
