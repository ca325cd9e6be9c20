//! Relational plugins for MetaEd.
//!
//! [`RelationalPlugin`] derives tables, columns, and foreign keys from the
//! model. [`PostgresqlPlugin`] and [`SqlServerPlugin`] name them under each
//! database's identifier rules and generate DDL.

pub mod enhancer;
pub mod generator;
pub mod model;
pub mod naming;
pub mod technology;

use metaed_model::PluginId;
use metaed_pipeline::{MetaEdPlugin, PluginComponents};

pub use model::{Column, ColumnType, ForeignKey, RelationalEntity, RelationalNamespace, Table, TableKey, TableKind};
pub use technology::{DatabaseNamespace, DeleteTrackingStyle, Technology};

use crate::{
    enhancer::{DatabaseNamingEnhancer, DeleteTrackingEnhancer, ForeignKeyEnhancer, MainTableEnhancer},
    generator::TableGenerator,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct RelationalPlugin;

impl MetaEdPlugin for RelationalPlugin {
    fn id(&self) -> PluginId {
        PluginId::EdfiOdsRelational
    }

    fn dependencies(&self) -> &'static [PluginId] {
        &[PluginId::Unified]
    }

    fn initialize(&self) -> PluginComponents {
        PluginComponents::new()
            .enhancer(MainTableEnhancer)
            .enhancer(ForeignKeyEnhancer)
    }
}

fn database_components(technology: Technology) -> PluginComponents {
    PluginComponents::new()
        .enhancer(DatabaseNamingEnhancer::new(technology))
        .enhancer(DeleteTrackingEnhancer::new(technology))
        .generator(TableGenerator::new(technology))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresqlPlugin;

impl MetaEdPlugin for PostgresqlPlugin {
    fn id(&self) -> PluginId {
        PluginId::EdfiOdsPostgresql
    }

    fn dependencies(&self) -> &'static [PluginId] {
        &[PluginId::Unified, PluginId::EdfiOdsRelational]
    }

    fn initialize(&self) -> PluginComponents {
        database_components(Technology::Postgresql)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SqlServerPlugin;

impl MetaEdPlugin for SqlServerPlugin {
    fn id(&self) -> PluginId {
        PluginId::EdfiOdsSqlServer
    }

    fn dependencies(&self) -> &'static [PluginId] {
        &[PluginId::Unified, PluginId::EdfiOdsRelational]
    }

    fn initialize(&self) -> PluginComponents {
        database_components(Technology::SqlServer)
    }
}
