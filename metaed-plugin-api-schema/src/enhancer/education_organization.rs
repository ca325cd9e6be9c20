//! Education organization hierarchy and authorization elements.
//!
//! The family is `EducationOrganization` from the first core namespace
//! together with every abstract entity, domain entity, and domain entity
//! subclass that inherits from it. Extensions of those entities are not
//! members of the family.

use std::collections::{BTreeMap, HashSet};

use metaed_model::{EntityId, EntityKind, Repository, flattened_identity};
use metaed_pipeline::{Enhancer, EnhancerResult, MetaEdEnvironment};
use tracing::debug;

use super::identity_json_paths::resource_entities;
use crate::{
    json_path::{identity_json_path, property_json_name, reference_json_name},
    model::{ApiSchemaEntity, ApiSchemaNamespace, SecurityElement, normalize},
};

pub const EDUCATION_ORGANIZATION: &str = "EducationOrganization";

const FAMILY_KINDS: [EntityKind; 3] = [
    EntityKind::AbstractEntity,
    EntityKind::DomainEntity,
    EntityKind::DomainEntitySubclass,
];

/// The `EducationOrganization` entity of the first core namespace.
pub fn education_organization_root(repository: &Repository) -> Option<EntityId> {
    let core = repository.namespaces().find(|namespace| !namespace.is_extension)?;
    repository.find_entity(
        &core.name,
        &[EntityKind::AbstractEntity, EntityKind::DomainEntity],
        EDUCATION_ORGANIZATION,
    )
}

/// Every member of the education organization family, in model order.
pub fn education_organization_family(repository: &Repository, root: EntityId) -> Vec<EntityId> {
    repository
        .entities_of(&FAMILY_KINDS)
        .into_iter()
        .filter(|id| repository.is_same_or_subclass_of(*id, root))
        .collect()
}

fn family_set(repository: &Repository) -> HashSet<EntityId> {
    education_organization_root(repository)
        .map(|root| education_organization_family(repository, root).into_iter().collect())
        .unwrap_or_default()
}

/// Records, per namespace, the education organization types and which other
/// members of the family each one references.
///
/// Fails the compilation when the core model has no `EducationOrganization`.
pub struct EducationOrganizationHierarchyEnhancer;

impl Enhancer for EducationOrganizationHierarchyEnhancer {
    fn name(&self) -> &'static str {
        "EducationOrganizationHierarchyEnhancer"
    }

    fn enhance(&self, environment: &mut MetaEdEnvironment) -> EnhancerResult {
        let repository = &environment.repository;
        let Some(root) = education_organization_root(repository) else {
            return EnhancerResult::failed(
                self.name(),
                "core namespace does not declare an EducationOrganization entity",
            );
        };
        let family = education_organization_family(repository, root);
        let members: HashSet<EntityId> = family.iter().copied().collect();

        let mut by_namespace: BTreeMap<String, ApiSchemaNamespace> = BTreeMap::new();
        for id in &family {
            let entity = repository.entity(*id);
            let slot = by_namespace.entry(entity.namespace.clone()).or_default();
            slot.education_organization_types.push(entity.meta_ed_name.clone());
            if *id == root {
                continue;
            }

            let mut parents: Vec<String> = entity
                .properties
                .iter()
                .filter_map(|property| property.referenced_entity)
                .filter(|target| members.contains(target))
                .map(|target| repository.entity(target).meta_ed_name.clone())
                .collect();
            normalize(&mut parents);
            slot.education_organization_hierarchy
                .insert(entity.meta_ed_name.clone(), parents);
        }

        for (name, mut computed) in by_namespace {
            normalize(&mut computed.education_organization_types);
            debug!(
                namespace = %name,
                types = computed.education_organization_types.len(),
                "education organization hierarchy"
            );
            if let Some(namespace) = environment.repository.namespace_mut(&name) {
                namespace.data.set(computed);
            }
        }
        EnhancerResult::ok(self.name())
    }
}

/// Collects every non-role-named, single reference to an education
/// organization as `{Property, $.xReference.identity}` pairs.
pub struct EducationOrganizationSecurityElementEnhancer;

impl Enhancer for EducationOrganizationSecurityElementEnhancer {
    fn name(&self) -> &'static str {
        "EducationOrganizationSecurityElementEnhancer"
    }

    fn enhance(&self, environment: &mut MetaEdEnvironment) -> EnhancerResult {
        let repository = &environment.repository;
        let family = family_set(repository);

        let mut derived = Vec::new();
        for id in resource_entities(repository) {
            let mut elements = Vec::new();
            for property_ref in repository.all_properties(id) {
                let property = repository.property(property_ref);
                if !property.kind.is_referential() || property.has_role_name() || property.is_collection() {
                    continue;
                }
                let Some(target) = property.referenced_entity.filter(|t| family.contains(t)) else {
                    continue;
                };
                for element in flattened_identity(repository, target) {
                    if element.chain.len() != 1 {
                        continue;
                    }
                    let leaf = repository.property(element.identity_property);
                    elements.push(SecurityElement::new(
                        property.meta_ed_name.clone(),
                        format!("$.{}.{}", reference_json_name(property), property_json_name(leaf)),
                    ));
                }
            }
            normalize(&mut elements);
            derived.push((id, elements));
        }

        for (id, elements) in derived {
            environment
                .repository
                .entity_mut(id)
                .data
                .get_or_default::<ApiSchemaEntity>()
                .education_organization_security_elements = elements;
        }
        EnhancerResult::ok(self.name())
    }
}

/// Identity elements that place a document under an education organization.
pub struct EducationOrganizationSecurableElementEnhancer;

impl Enhancer for EducationOrganizationSecurableElementEnhancer {
    fn name(&self) -> &'static str {
        "EducationOrganizationSecurableElementEnhancer"
    }

    fn enhance(&self, environment: &mut MetaEdEnvironment) -> EnhancerResult {
        let repository = &environment.repository;
        let family = family_set(repository);

        let mut derived = Vec::new();
        for id in resource_entities(repository) {
            let mut elements = Vec::new();
            for element in flattened_identity(repository, id) {
                let chain: Vec<_> = element.chain.iter().map(|p| repository.property(*p)).collect();
                if chain.iter().any(|p| p.has_role_name()) {
                    continue;
                }
                let path = identity_json_path(repository, &element);
                if chain.len() == 1 {
                    if family.contains(&id) {
                        let leaf = repository.property(element.identity_property);
                        elements.push(SecurityElement::new(leaf.meta_ed_name.clone(), path));
                    }
                    continue;
                }
                let reaches_family = chain.iter().any(|p| {
                    p.kind.is_referential() && p.referenced_entity.is_some_and(|t| family.contains(&t))
                });
                if reaches_family {
                    elements.push(SecurityElement::new(chain[0].meta_ed_name.clone(), path));
                }
            }
            normalize(&mut elements);
            derived.push((id, elements));
        }

        for (id, elements) in derived {
            environment
                .repository
                .entity_mut(id)
                .data
                .get_or_default::<ApiSchemaEntity>()
                .education_organization_securable_elements = elements;
        }
        EnhancerResult::ok(self.name())
    }
}
