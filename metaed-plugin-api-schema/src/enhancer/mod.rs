//! API schema enhancers, in the order [`ApiSchemaPlugin`](crate::ApiSchemaPlugin) runs them.

mod document_paths;
mod education_organization;
mod identity_json_paths;
mod json_schema;
mod namespace_security;
mod securable;

pub use document_paths::{DocumentPathsMapping, DocumentPathsMappingEnhancer, coercion_paths, document_paths_mapping};
pub use education_organization::{
    EDUCATION_ORGANIZATION, EducationOrganizationHierarchyEnhancer,
    EducationOrganizationSecurableElementEnhancer, EducationOrganizationSecurityElementEnhancer,
    education_organization_family, education_organization_root,
};
pub use identity_json_paths::IdentityJsonPathsEnhancer;
pub use json_schema::{JSON_SCHEMA_DIALECT, JsonSchemaEnhancer, descriptor_schema, resource_json_schema};
pub use namespace_security::NamespaceSecurityElementEnhancer;
pub use securable::{
    ContactSecurableElementEnhancer, Person, StudentSecurableElementEnhancer, person_securable_paths,
};
