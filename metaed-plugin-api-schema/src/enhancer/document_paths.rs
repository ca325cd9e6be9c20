//! Where each top-level property of a resource lives in its documents.
//!
//! A reference pairs every identity path of the referenced resource with
//! the path holding the same value inside the referencing document. Common
//! and inline common content is keyed by its dotted property path.

use std::collections::BTreeMap;

use metaed_core::decapitalize;
use metaed_model::{EntityId, EntityKind, EntityProperty, PropertyKind, Repository, flattened_identity};
use metaed_pipeline::{Enhancer, EnhancerResult, MetaEdEnvironment};
use tracing::debug;

use super::identity_json_paths::resource_entities;
use crate::{
    json_path::{
        collection_json_name, document_properties, identity_json_path, nested_json_name, path_type, property_json_name,
        reference_json_name,
    },
    model::{
        ApiSchemaEntity, DescriptorReferencePath, DocumentPaths, DocumentReferencePaths, PathType, ReferenceJsonPaths,
        ScalarPath, normalize,
    },
};

pub type DocumentPathsMapping = BTreeMap<String, DocumentPaths>;

fn project_name(repository: &Repository, entity: EntityId) -> String {
    let namespace = &repository.entity(entity).namespace;
    repository
        .namespace(namespace)
        .map_or_else(|| namespace.clone(), |namespace| namespace.project_name.clone())
}

/// JSON path of the value itself, or of the array element holding it.
fn value_path(json_prefix: &str, property: &EntityProperty, name: &str) -> String {
    if property.is_collection() {
        format!("{json_prefix}.{}[*].{name}", collection_json_name(property))
    } else {
        format!("{json_prefix}.{name}")
    }
}

fn reference_paths(repository: &Repository, property: &EntityProperty, json_prefix: &str) -> DocumentPaths {
    let reference = value_path(json_prefix, property, &reference_json_name(property));
    let (project_name, resource_name, mut reference_json_paths) = match property.referenced_entity {
        Some(target) => {
            let paths: Vec<ReferenceJsonPaths> = flattened_identity(repository, target)
                .iter()
                .map(|element| ReferenceJsonPaths {
                    identity_json_path: identity_json_path(repository, element),
                    reference_json_path: format!("{reference}.{}", nested_json_name(repository, &element.chain)),
                    path_type: path_type(repository.property(element.identity_property).kind),
                })
                .collect();
            let resource_name = repository.entity(target).meta_ed_name.clone();
            (project_name(repository, target), resource_name, paths)
        }
        None => (String::new(), property.referenced_name().to_string(), Vec::new()),
    };
    normalize(&mut reference_json_paths);
    DocumentPaths::Reference(DocumentReferencePaths {
        is_reference: true,
        is_descriptor: false,
        project_name,
        resource_name,
        reference_json_paths,
    })
}

fn collect_paths(
    repository: &Repository,
    entity: EntityId,
    property_path: Option<&str>,
    json_prefix: &str,
    mapping: &mut DocumentPathsMapping,
) {
    for property_ref in document_properties(repository, entity) {
        let property = repository.property(property_ref);
        let key = match property_path {
            Some(parent) => format!("{parent}.{}", property.full_property_name()),
            None => property.full_property_name(),
        };

        let paths = match property.kind {
            kind if kind.is_referential() => reference_paths(repository, property, json_prefix),
            PropertyKind::Descriptor => {
                let descriptor_project = property
                    .referenced_entity
                    .map(|target| project_name(repository, target))
                    .unwrap_or_default();
                DocumentPaths::Descriptor(DescriptorReferencePath {
                    is_reference: true,
                    is_descriptor: true,
                    project_name: descriptor_project,
                    resource_name: format!("{}Descriptor", property.referenced_name()),
                    path: value_path(json_prefix, property, &property_json_name(property)),
                    path_type: PathType::String,
                })
            }
            PropertyKind::Common => {
                if let Some(target) = property.referenced_entity {
                    let object = decapitalize(&property.full_property_name());
                    let nested_prefix = if property.is_collection() {
                        format!("{json_prefix}.{}[*]", collection_json_name(property))
                    } else {
                        format!("{json_prefix}.{object}")
                    };
                    collect_paths(repository, target, Some(&key), &nested_prefix, mapping);
                }
                continue;
            }
            PropertyKind::InlineCommon | PropertyKind::Choice => {
                if let Some(target) = property.referenced_entity {
                    collect_paths(repository, target, Some(&key), json_prefix, mapping);
                }
                continue;
            }
            kind => DocumentPaths::Scalar(ScalarPath {
                is_reference: false,
                path: value_path(json_prefix, property, &property_json_name(property)),
                path_type: path_type(kind),
            }),
        };
        mapping.insert(key, paths);
    }
}

/// Document paths of every top-level property of a concrete resource.
pub fn document_paths_mapping(repository: &Repository, entity: EntityId) -> DocumentPathsMapping {
    let mut mapping = DocumentPathsMapping::new();
    collect_paths(repository, entity, None, "$", &mut mapping);
    mapping
}

/// Sorted paths of values that arrive as strings but must be coerced to `path_type`.
pub fn coercion_paths(mapping: &DocumentPathsMapping, path_type: PathType) -> Vec<String> {
    let mut paths: Vec<String> = mapping
        .values()
        .flat_map(DocumentPaths::typed_paths)
        .filter(|(_, found)| *found == path_type)
        .map(|(path, _)| path.to_string())
        .collect();
    normalize(&mut paths);
    paths
}

/// Records document paths and the boolean, numeric, and date-time paths
/// derived from them. Descriptors have no document paths.
pub struct DocumentPathsMappingEnhancer;

impl Enhancer for DocumentPathsMappingEnhancer {
    fn name(&self) -> &'static str {
        "DocumentPathsMappingEnhancer"
    }

    fn enhance(&self, environment: &mut MetaEdEnvironment) -> EnhancerResult {
        let repository = &environment.repository;
        let derived: Vec<_> = resource_entities(repository)
            .into_iter()
            .filter_map(|id| match repository.entity(id).kind {
                EntityKind::AbstractEntity => None,
                EntityKind::Descriptor => Some((id, DocumentPathsMapping::new())),
                _ => Some((id, document_paths_mapping(repository, id))),
            })
            .collect();

        debug!(resources = derived.len(), "document paths mapped");
        for (id, mapping) in derived {
            let slot = environment.repository.entity_mut(id).data.get_or_default::<ApiSchemaEntity>();
            slot.boolean_json_paths = coercion_paths(&mapping, PathType::Boolean);
            slot.numeric_json_paths = coercion_paths(&mapping, PathType::Number);
            slot.date_time_json_paths = coercion_paths(&mapping, PathType::DateTime);
            slot.document_paths_mapping = mapping;
        }
        EnhancerResult::ok(self.name())
    }
}

#[cfg(test)]
mod tests {
    use metaed_core::SemVer;
    use metaed_model::{ModelBuilder, PropertyDecl, resolve_references};

    use super::*;

    fn repository() -> Repository {
        let mut repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .descriptor("GradeLevel")
            .domain_entity("School")
            .identity(PropertyKind::Integer, "SchoolId")
            .domain_entity("Session")
            .identity(PropertyKind::DomainEntity, "School")
            .identity(PropertyKind::String, "SessionName")
            .common("Address")
            .required(PropertyKind::String, "City")
            .domain_entity("Section")
            .identity(PropertyKind::DomainEntity, "Session")
            .property(PropertyDecl::new(PropertyKind::DomainEntity, "School").role_name("Alternate").optional())
            .optional(PropertyKind::Boolean, "IsVirtual")
            .optional(PropertyKind::Datetime, "LastModified")
            .collection(PropertyKind::Descriptor, "GradeLevel")
            .property(PropertyDecl::new(PropertyKind::Common, "Address").optional().collection())
            .build()
            .unwrap();
        resolve_references(&mut repository);
        repository
    }

    fn section_mapping(repository: &Repository) -> DocumentPathsMapping {
        let section = repository.find_entity("EdFi", &[EntityKind::DomainEntity], "Section").unwrap();
        document_paths_mapping(repository, section)
    }

    #[test]
    fn test_reference_paths_pair_identity_with_reference() {
        let repository = repository();
        let mapping = section_mapping(&repository);
        insta::assert_snapshot!(serde_json::to_string_pretty(&mapping["Session"]).unwrap(), @r#"
        {
          "isReference": true,
          "isDescriptor": false,
          "projectName": "EdFi",
          "resourceName": "Session",
          "referenceJsonPaths": [
            {
              "identityJsonPath": "$.schoolReference.schoolId",
              "referenceJsonPath": "$.sessionReference.schoolId",
              "type": "number"
            },
            {
              "identityJsonPath": "$.sessionName",
              "referenceJsonPath": "$.sessionReference.sessionName",
              "type": "string"
            }
          ]
        }
        "#);
        let DocumentPaths::Reference(alternate) = &mapping["AlternateSchool"] else {
            panic!("expected a reference");
        };
        assert_eq!(alternate.reference_json_paths[0].reference_json_path, "$.alternateSchoolReference.schoolId");
    }

    #[test]
    fn test_collection_and_common_paths() {
        let repository = repository();
        let mapping = section_mapping(&repository);
        let paths: Vec<String> = mapping
            .iter()
            .map(|(key, paths)| format!("{key} {:?}", paths.typed_paths()))
            .collect();
        insta::assert_debug_snapshot!(paths, @r#"
        [
            "Address.City [(\"$.addresses[*].city\", String)]",
            "AlternateSchool [(\"$.alternateSchoolReference.schoolId\", Number)]",
            "GradeLevel [(\"$.gradeLevels[*].gradeLevelDescriptor\", String)]",
            "IsVirtual [(\"$.isVirtual\", Boolean)]",
            "LastModified [(\"$.lastModified\", DateTime)]",
            "Session [(\"$.sessionReference.schoolId\", Number), (\"$.sessionReference.sessionName\", String)]",
        ]
        "#);
    }

    #[test]
    fn test_enhancer_fills_coercion_paths() {
        let mut environment = MetaEdEnvironment::new(repository(), SemVer::new(5, 0, 0));
        assert!(DocumentPathsMappingEnhancer.enhance(&mut environment).success);

        let repository = &environment.repository;
        let section = repository.find_entity("EdFi", &[EntityKind::DomainEntity], "Section").unwrap();
        let slot = repository.entity(section).data.get::<ApiSchemaEntity>().unwrap();
        assert_eq!(slot.boolean_json_paths, ["$.isVirtual"]);
        assert_eq!(
            slot.numeric_json_paths,
            ["$.alternateSchoolReference.schoolId", "$.sessionReference.schoolId"]
        );
        assert_eq!(slot.date_time_json_paths, ["$.lastModified"]);

        let grade_level = repository.find_entity("EdFi", &[EntityKind::Descriptor], "GradeLevel").unwrap();
        let slot = repository.entity(grade_level).data.get::<ApiSchemaEntity>().unwrap();
        assert!(slot.document_paths_mapping.is_empty());
    }
}
