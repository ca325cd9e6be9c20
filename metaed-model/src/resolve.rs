//! Reference resolution.
//!
//! Turns the string typed references left by the builder (base entity
//! names, property target names) into [`EntityId`] links. A namespace sees
//! its own entities first and then those of the namespaces it transitively
//! depends on, nearest first, so a local declaration shadows a core one of
//! the same kind and name. Anything else is invisible.
//!
//! Nothing here fails hard. Every name that cannot be resolved is returned
//! as an [`UnresolvedReference`] and the link is left as `None`.

use serde::Serialize;
use tracing::{debug, warn};

use crate::{EntityId, EntityKind, PropertyRef, Repository, SourceMap};

/// A reference that matched no visible entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedReference {
    /// Name of the diagnostic this condition is reported under
    pub validator_name: &'static str,
    pub entity: EntityId,
    /// Index of the offending property, `None` for an unresolved base
    pub property: Option<usize>,
    /// Namespace the reference was made from
    pub namespace: String,
    pub referenced_name: String,
    pub message: String,
    pub source_map: SourceMap,
}

enum Link {
    Base(EntityId, EntityId),
    Property(PropertyRef, EntityId),
}

/// Resolve every base and property reference in the repository.
///
/// Entities are visited in declaration order, so the returned list is stable
/// for a given model.
pub fn resolve_references(repository: &mut Repository) -> Vec<UnresolvedReference> {
    let mut links = Vec::new();
    let mut unresolved = Vec::new();

    for index in 0..repository.entity_count() {
        let entity = repository.entity(EntityId(index));

        if let Some(base_name) = &entity.base_entity_name {
            let kinds = entity.kind.base_kinds();
            match lookup(
                repository,
                &entity.namespace,
                entity.base_entity_namespace.as_deref(),
                kinds,
                base_name,
            ) {
                Some(base) => links.push(Link::Base(entity.id, base)),
                None => unresolved.push(UnresolvedReference {
                    validator_name: entity.kind.unresolved_base_validator(),
                    entity: entity.id,
                    property: None,
                    namespace: entity.namespace.clone(),
                    referenced_name: base_name.clone(),
                    message: format!(
                        "{} '{}' based on '{}' does not match any declared {} visible from namespace '{}'",
                        entity.kind,
                        entity.meta_ed_name,
                        qualified(entity.base_entity_namespace.as_deref(), base_name),
                        describe(kinds),
                        entity.namespace
                    ),
                    source_map: entity.source_map.clone(),
                }),
            }
        }

        for (i, property) in entity.properties.iter().enumerate() {
            let kinds = property.kind.target_kinds();
            if kinds.is_empty() {
                continue;
            }
            match lookup(
                repository,
                &entity.namespace,
                property.referenced_namespace.as_deref(),
                kinds,
                property.referenced_name(),
            ) {
                Some(target) => links.push(Link::Property(PropertyRef::new(entity.id, i), target)),
                None => unresolved.push(UnresolvedReference {
                    validator_name: property.kind.unresolved_reference_validator(),
                    entity: entity.id,
                    property: Some(i),
                    namespace: entity.namespace.clone(),
                    referenced_name: property.referenced_name().to_string(),
                    message: format!(
                        "{} property '{}' on {} '{}' does not match any declared {} visible from namespace '{}'",
                        property.kind,
                        qualified(property.referenced_namespace.as_deref(), property.referenced_name()),
                        entity.kind,
                        entity.meta_ed_name,
                        describe(kinds),
                        entity.namespace
                    ),
                    source_map: property.source_map.clone(),
                }),
            }
        }
    }

    let resolved = links.len();
    for link in links {
        match link {
            Link::Base(entity, base) => repository.entity_mut(entity).base_entity = Some(base),
            Link::Property(property, target) => {
                repository.property_mut(property).referenced_entity = Some(target)
            }
        }
    }

    for reference in &unresolved {
        warn!(
            validator = reference.validator_name,
            namespace = %reference.namespace,
            name = %reference.referenced_name,
            "unresolved reference"
        );
    }
    debug!(resolved, unresolved = unresolved.len(), "reference resolution complete");
    unresolved
}

/// Find the entity a reference from namespace `from` names.
///
/// An explicit `qualifier` restricts the search to that namespace, provided
/// it is visible from `from`.
pub fn lookup(
    repository: &Repository,
    from: &str,
    qualifier: Option<&str>,
    kinds: &[EntityKind],
    name: &str,
) -> Option<EntityId> {
    match qualifier {
        Some(namespace) if repository.is_visible(from, namespace) => {
            repository.find_entity(namespace, kinds, name)
        }
        Some(_) => None,
        None => std::iter::once(from)
            .chain(repository.dependency_chain(from))
            .find_map(|namespace| repository.find_entity(namespace, kinds, name)),
    }
}

fn qualified(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(namespace) => format!("{namespace}.{name}"),
        None => name.to_string(),
    }
}

fn describe(kinds: &[EntityKind]) -> String {
    kinds
        .iter()
        .map(EntityKind::as_str)
        .collect::<Vec<_>>()
        .join(" or ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ModelBuilder, PropertyDecl, PropertyKind};

    #[test]
    fn test_resolves_property_and_base() {
        let mut repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .abstract_entity("EducationOrganization")
            .identity(PropertyKind::Integer, "EducationOrganizationId")
            .domain_entity_subclass("School", "EducationOrganization")
            .domain_entity("Student")
            .required(PropertyKind::DomainEntity, "School")
            .build()
            .unwrap();

        let unresolved = resolve_references(&mut repository);
        assert!(unresolved.is_empty());

        let school = repository
            .find_entity("EdFi", &[EntityKind::DomainEntitySubclass], "School")
            .unwrap();
        let eo = repository
            .find_entity("EdFi", &[EntityKind::AbstractEntity], "EducationOrganization")
            .unwrap();
        let student = repository
            .find_entity("EdFi", &[EntityKind::DomainEntity], "Student")
            .unwrap();

        assert_eq!(repository.entity(school).base_entity, Some(eo));
        assert_eq!(repository.entity(student).properties[0].referenced_entity, Some(school));
    }

    #[test]
    fn test_resolution_is_kind_scoped() {
        let mut repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .association("Foo")
            .domain_entity("Bar")
            .required(PropertyKind::DomainEntity, "Foo")
            .build()
            .unwrap();

        let unresolved = resolve_references(&mut repository);
        assert_eq!(unresolved.len(), 1);
        assert_eq!(
            unresolved[0].validator_name,
            "DomainEntityPropertyMustMatchADomainEntity"
        );
        assert_eq!(
            unresolved[0].message,
            "domainEntity property 'Foo' on domainEntity 'Bar' does not match any declared \
             domainEntity or domainEntitySubclass or abstractEntity visible from namespace 'EdFi'"
        );
    }

    #[test]
    fn test_unresolved_base() {
        let mut repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .domain_entity_subclass("School", "Missing")
            .build()
            .unwrap();

        let unresolved = resolve_references(&mut repository);
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].property, None);
        assert_eq!(
            unresolved[0].validator_name,
            "DomainEntitySubclassIdentifierMustMatchADomainOrAbstractEntity"
        );
    }

    #[test]
    fn test_qualifier_must_be_visible() {
        let mut repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .domain_entity("School")
            .extension_namespace("Sample", "Sample")
            .domain_entity("Bus")
            .required(PropertyKind::DomainEntity, "EdFi.School")
            .extension_namespace("Other", "Other")
            .domain_entity("Route")
            .required(PropertyKind::DomainEntity, "Sample.Bus")
            .build()
            .unwrap();

        let unresolved = resolve_references(&mut repository);
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].namespace, "Other");
        assert_eq!(unresolved[0].referenced_name, "Bus");
    }

    #[test]
    fn test_named_shared_property_resolves_by_type() {
        let mut repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .shared_string("URI")
            .domain_entity("Survey")
            .property(PropertyDecl::new(PropertyKind::SharedString, "URI").named("Namespace").identity())
            .build()
            .unwrap();

        assert!(resolve_references(&mut repository).is_empty());
        let survey = repository
            .find_entity("EdFi", &[EntityKind::DomainEntity], "Survey")
            .unwrap();
        let property = &repository.entity(survey).properties[0];
        assert_eq!(property.full_property_name(), "Namespace");
        assert_eq!(
            property.referenced_entity,
            repository.find_entity("EdFi", &[EntityKind::SharedString], "URI")
        );
    }
}
