use metaed_model::{EntityId, EntityKind, EntityProperty, PropertyKind, Repository, flattened_identity};
use metaed_pipeline::{Enhancer, EnhancerResult, MetaEdEnvironment};

use super::identity_json_paths::resource_entities;
use crate::{
    json_path::reference_json_name,
    model::{ApiSchemaEntity, normalize},
};

/// A `shared string URI named Namespace` property.
fn is_namespace_property(property: &EntityProperty) -> bool {
    property.kind == PropertyKind::SharedString
        && property.full_property_name() == "Namespace"
        && property.referenced_name() == "URI"
        && !property.has_role_name()
}

fn namespace_identity(repository: &Repository, entity: EntityId) -> bool {
    flattened_identity(repository, entity)
        .iter()
        .any(|element| element.chain.len() == 1 && is_namespace_property(repository.property(element.identity_property)))
}

fn namespace_security_paths(repository: &Repository, entity: EntityId) -> Vec<String> {
    if repository.entity(entity).kind == EntityKind::Descriptor {
        return vec!["$.namespace".to_string()];
    }
    let mut paths = Vec::new();
    for property_ref in repository.all_properties(entity) {
        let property = repository.property(property_ref);
        if is_namespace_property(property) && (property.is_identity() || property.is_required()) {
            paths.push("$.namespace".to_string());
            continue;
        }
        if !property.kind.is_referential() || property.has_role_name() || property.is_collection() {
            continue;
        }
        if property.referenced_entity.is_some_and(|target| namespace_identity(repository, target)) {
            paths.push(format!("$.{}.namespace", reference_json_name(property)));
        }
    }
    normalize(&mut paths);
    paths
}

/// JSON paths of namespace values that scope a document's authorization.
pub struct NamespaceSecurityElementEnhancer;

impl Enhancer for NamespaceSecurityElementEnhancer {
    fn name(&self) -> &'static str {
        "NamespaceSecurityElementEnhancer"
    }

    fn enhance(&self, environment: &mut MetaEdEnvironment) -> EnhancerResult {
        let derived: Vec<_> = resource_entities(&environment.repository)
            .into_iter()
            .map(|id| (id, namespace_security_paths(&environment.repository, id)))
            .collect();
        for (id, paths) in derived {
            environment
                .repository
                .entity_mut(id)
                .data
                .get_or_default::<ApiSchemaEntity>()
                .namespace_security_elements = paths;
        }
        EnhancerResult::ok(self.name())
    }
}
