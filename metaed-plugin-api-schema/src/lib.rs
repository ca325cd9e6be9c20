//! API schema plugin for MetaEd.
//!
//! Derives, per resource, the JSON paths of its identity, its insert body
//! schema, where each property lives in its documents, and the elements API
//! authorization is scoped by, then writes one `ApiSchema.json` per
//! namespace.
//!
//! - [`json_path`] - JSON locations of model properties
//! - [`enhancer`] - identity paths, body schemas, document paths, and security elements
//! - [`generator`] - document serialization

pub mod enhancer;
pub mod generator;
pub mod json_path;
pub mod model;

use metaed_model::PluginId;
use metaed_pipeline::{MetaEdPlugin, PluginComponents};

pub use generator::ApiSchemaGenerator;
pub use model::{ApiSchemaEntity, ApiSchemaNamespace, DocumentPaths, JsonSchema, PathType, SecurityElement};

use crate::enhancer::{
    ContactSecurableElementEnhancer, DocumentPathsMappingEnhancer, EducationOrganizationHierarchyEnhancer,
    EducationOrganizationSecurableElementEnhancer, EducationOrganizationSecurityElementEnhancer,
    IdentityJsonPathsEnhancer, JsonSchemaEnhancer, NamespaceSecurityElementEnhancer, StudentSecurableElementEnhancer,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct ApiSchemaPlugin;

impl MetaEdPlugin for ApiSchemaPlugin {
    fn id(&self) -> PluginId {
        PluginId::EdfiApiSchema
    }

    fn dependencies(&self) -> &'static [PluginId] {
        &[PluginId::Unified]
    }

    fn initialize(&self) -> PluginComponents {
        PluginComponents::new()
            .enhancer(IdentityJsonPathsEnhancer)
            .enhancer(JsonSchemaEnhancer)
            .enhancer(DocumentPathsMappingEnhancer)
            .enhancer(EducationOrganizationHierarchyEnhancer)
            .enhancer(EducationOrganizationSecurityElementEnhancer)
            .enhancer(EducationOrganizationSecurableElementEnhancer)
            .enhancer(StudentSecurableElementEnhancer)
            .enhancer(ContactSecurableElementEnhancer)
            .enhancer(NamespaceSecurityElementEnhancer)
            .generator(ApiSchemaGenerator)
    }
}
