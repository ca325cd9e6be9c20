//! `ApiSchema.json` generation.
//!
//! One document per namespace. Maps are ordered so the output is byte for
//! byte the same across runs.

use std::collections::BTreeMap;

use eyre::Result;
use metaed_core::{GeneratedOutput, to_snake_case};
use metaed_model::{Entity, EntityKind, Namespace, Repository};
use metaed_pipeline::{Generator, MetaEdEnvironment};
use serde::Serialize;
use tracing::debug;

use crate::model::{ApiSchemaEntity, ApiSchemaNamespace, DocumentPaths, JsonSchema, SecurityElement};

pub const API_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiSchemaDocument<'a> {
    api_schema_version: &'static str,
    project_schema: ProjectSchema<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectSchema<'a> {
    project_name: &'a str,
    project_version: &'a str,
    project_endpoint_name: String,
    is_extension_project: bool,
    compatible_ds_range: Option<String>,
    education_organization_types: &'a [String],
    education_organization_hierarchy: Option<&'a BTreeMap<String, Vec<String>>>,
    abstract_resources: BTreeMap<&'a str, AbstractResource<'a>>,
    /// Resource name to endpoint name
    resource_name_mapping: BTreeMap<&'a str, &'a str>,
    /// Lowercased endpoint name to endpoint name
    case_insensitive_endpoint_name_mapping: BTreeMap<String, &'a str>,
    resource_schemas: BTreeMap<&'a str, ResourceSchema<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AbstractResource<'a> {
    identity_json_paths: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceSchema<'a> {
    resource_name: &'a str,
    is_descriptor: bool,
    is_subclass: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    subclass_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    superclass_resource_name: Option<&'a str>,
    json_schema_for_insert: Option<&'a JsonSchema>,
    identity_json_paths: &'a [String],
    boolean_json_paths: &'a [String],
    numeric_json_paths: &'a [String],
    date_time_json_paths: &'a [String],
    document_paths_mapping: &'a BTreeMap<String, DocumentPaths>,
    security_elements: SecurityElements<'a>,
    authorization_securable: AuthorizationSecurable<'a>,
}

#[derive(Debug, Serialize)]
struct SecurityElements<'a> {
    #[serde(rename = "Namespace")]
    namespace: &'a [String],
    #[serde(rename = "EducationOrganization")]
    education_organization: &'a [SecurityElement],
}

#[derive(Debug, Serialize)]
struct AuthorizationSecurable<'a> {
    #[serde(rename = "Student")]
    student: &'a [String],
    #[serde(rename = "Contact")]
    contact: &'a [String],
    #[serde(rename = "EducationOrganization")]
    education_organization: &'a [SecurityElement],
}

fn resource_schema<'a>(repository: &'a Repository, entity: &'a Entity, slot: &'a ApiSchemaEntity) -> ResourceSchema<'a> {
    let subclass_type = match entity.kind {
        EntityKind::DomainEntitySubclass => Some("domainEntity"),
        EntityKind::AssociationSubclass => Some("association"),
        _ => None,
    };
    let superclass_resource_name = subclass_type
        .and(entity.base_entity)
        .map(|base| repository.entity(base).meta_ed_name.as_str());
    ResourceSchema {
        resource_name: &slot.resource_name,
        is_descriptor: entity.kind == EntityKind::Descriptor,
        is_subclass: subclass_type.is_some(),
        subclass_type,
        superclass_resource_name,
        json_schema_for_insert: slot.json_schema_for_insert.as_ref(),
        identity_json_paths: &slot.identity_json_paths,
        boolean_json_paths: &slot.boolean_json_paths,
        numeric_json_paths: &slot.numeric_json_paths,
        date_time_json_paths: &slot.date_time_json_paths,
        document_paths_mapping: &slot.document_paths_mapping,
        security_elements: SecurityElements {
            namespace: &slot.namespace_security_elements,
            education_organization: &slot.education_organization_security_elements,
        },
        authorization_securable: AuthorizationSecurable {
            student: &slot.student_securable_elements,
            contact: &slot.contact_securable_elements,
            education_organization: &slot.education_organization_securable_elements,
        },
    }
}

fn project_schema<'a>(environment: &'a MetaEdEnvironment, namespace: &'a Namespace) -> ProjectSchema<'a> {
    let repository = &environment.repository;
    let hierarchy = namespace.data.get::<ApiSchemaNamespace>();

    let mut abstract_resources = BTreeMap::new();
    let mut resource_name_mapping = BTreeMap::new();
    let mut case_insensitive_endpoint_name_mapping = BTreeMap::new();
    let mut resource_schemas = BTreeMap::new();
    for id in repository.entity_ids() {
        let entity = repository.entity(id);
        if entity.namespace != namespace.name || !entity.kind.is_top_level_resource() {
            continue;
        }
        let Some(slot) = entity.data.get::<ApiSchemaEntity>() else {
            continue;
        };
        if entity.kind == EntityKind::AbstractEntity {
            abstract_resources.insert(
                slot.resource_name.as_str(),
                AbstractResource {
                    identity_json_paths: &slot.identity_json_paths,
                },
            );
        } else {
            resource_name_mapping.insert(slot.resource_name.as_str(), slot.endpoint_name.as_str());
            case_insensitive_endpoint_name_mapping.insert(slot.endpoint_name.to_lowercase(), slot.endpoint_name.as_str());
            resource_schemas.insert(slot.endpoint_name.as_str(), resource_schema(repository, entity, slot));
        }
    }

    ProjectSchema {
        project_name: &namespace.project_name,
        project_version: &namespace.project_version,
        project_endpoint_name: to_snake_case(&namespace.project_name).replace('_', "-"),
        is_extension_project: namespace.is_extension,
        compatible_ds_range: namespace
            .is_extension
            .then(|| format!(">={}", environment.data_standard_version)),
        education_organization_types: hierarchy
            .map(|h| h.education_organization_types.as_slice())
            .unwrap_or_default(),
        education_organization_hierarchy: hierarchy.map(|h| &h.education_organization_hierarchy),
        abstract_resources,
        resource_name_mapping,
        case_insensitive_endpoint_name_mapping,
        resource_schemas,
    }
}

/// Serializes each namespace's API schema.
pub struct ApiSchemaGenerator;

impl Generator for ApiSchemaGenerator {
    fn name(&self) -> &'static str {
        "ApiSchemaGenerator"
    }

    fn generate(&self, environment: &MetaEdEnvironment) -> Result<Vec<GeneratedOutput>> {
        let mut outputs = Vec::new();
        for namespace in environment.repository.namespaces() {
            let document = ApiSchemaDocument {
                api_schema_version: API_SCHEMA_VERSION,
                project_schema: project_schema(environment, namespace),
            };
            let file_name = if namespace.is_extension {
                "ApiSchema-EXTENSION.json"
            } else {
                "ApiSchema.json"
            };
            debug!(
                namespace = %namespace.name,
                resources = document.project_schema.resource_schemas.len(),
                "api schema generated"
            );
            outputs.push(GeneratedOutput::new(
                "ApiSchema.json",
                &namespace.name,
                "ApiSchema",
                file_name,
                serde_json::to_string_pretty(&document)?,
            ));
        }
        Ok(outputs)
    }
}
