use metaed_core::{decapitalize, pluralize};
use metaed_model::{EntityId, EntityKind, Repository, flattened_identity};
use metaed_pipeline::{Enhancer, EnhancerResult, MetaEdEnvironment};
use tracing::debug;

use crate::{
    json_path::identity_json_path,
    model::{ApiSchemaEntity, normalize},
};

/// Entity kinds that are API resources, including abstract ones.
pub(crate) fn resource_entities(repository: &Repository) -> Vec<EntityId> {
    repository
        .entity_ids()
        .filter(|id| repository.entity(*id).kind.is_top_level_resource())
        .collect()
}

/// Names each resource and records the JSON paths of its identity.
///
/// Descriptors are identified by `$.codeValue` and `$.namespace`.
pub struct IdentityJsonPathsEnhancer;

impl Enhancer for IdentityJsonPathsEnhancer {
    fn name(&self) -> &'static str {
        "IdentityJsonPathsEnhancer"
    }

    fn enhance(&self, environment: &mut MetaEdEnvironment) -> EnhancerResult {
        let repository = &environment.repository;

        let mut derived = Vec::new();
        for id in resource_entities(repository) {
            let entity = repository.entity(id);
            let resource_name = match entity.kind {
                EntityKind::Descriptor => format!("{}Descriptor", entity.meta_ed_name),
                _ => entity.meta_ed_name.clone(),
            };
            let mut identity_json_paths: Vec<String> = match entity.kind {
                EntityKind::Descriptor => vec!["$.codeValue".to_string(), "$.namespace".to_string()],
                _ => flattened_identity(repository, id)
                    .iter()
                    .map(|element| identity_json_path(repository, element))
                    .collect(),
            };
            normalize(&mut identity_json_paths);
            derived.push((id, resource_name, identity_json_paths));
        }

        let count = derived.len();
        for (id, resource_name, identity_json_paths) in derived {
            let slot = environment.repository.entity_mut(id).data.get_or_default::<ApiSchemaEntity>();
            slot.endpoint_name = decapitalize(&pluralize(&resource_name));
            slot.resource_name = resource_name;
            slot.identity_json_paths = identity_json_paths;
        }
        debug!(resources = count, "identity json paths derived");
        EnhancerResult::ok(self.name())
    }
}
