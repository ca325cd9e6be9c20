//! Property path lookup across reference chains.
//!
//! A path such as `["StudentSchoolAssociation", "School", "SchoolId"]` is
//! resolved one segment at a time, starting on an entity. Each segment must
//! name exactly one property (own or inherited) by its full property name.
//! A non-final segment must be a domain entity or association reference,
//! whose target becomes the entity the next segment is looked up on.

use metaed_model::{EntityId, EntityProperty, PropertyRef, Repository};

/// Outcome of resolving a property path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathResolution {
    Found(PropertyRef),
    /// No property matches the segment at this index
    NotFound { segment: usize },
    /// More than one property matches the segment at this index
    Ambiguous { segment: usize },
    /// The segment resolved, but the matcher refused it or it cannot be followed
    Rejected { segment: usize },
}

impl PathResolution {
    pub fn found(&self) -> Option<PropertyRef> {
        match self {
            PathResolution::Found(property) => Some(*property),
            _ => None,
        }
    }
}

/// Every segment must be part of the identity of the entity it is found on.
pub fn match_all_identity_reference_properties(property: &EntityProperty, _segment: usize) -> bool {
    property.is_identity()
}

/// The first segment may be any property, every following one must be identity.
pub fn match_all_but_first_as_identity_properties(property: &EntityProperty, segment: usize) -> bool {
    segment == 0 || property.is_identity()
}

/// Resolve `path` starting on `entity`, reporting where resolution stopped.
pub fn resolve_property_path<M>(
    repository: &Repository,
    entity: EntityId,
    path: &[String],
    matcher: M,
) -> PathResolution
where
    M: Fn(&EntityProperty, usize) -> bool,
{
    let mut current = entity;
    for (segment, name) in path.iter().enumerate() {
        let mut candidates = repository
            .all_properties(current)
            .into_iter()
            .filter(|p| repository.property(*p).full_property_name() == *name);

        let Some(found) = candidates.next() else {
            return PathResolution::NotFound { segment };
        };
        if candidates.next().is_some() {
            return PathResolution::Ambiguous { segment };
        }

        let property = repository.property(found);
        if !matcher(property, segment) {
            return PathResolution::Rejected { segment };
        }
        if segment + 1 == path.len() {
            return PathResolution::Found(found);
        }

        match property.referenced_entity {
            Some(next) if property.kind.is_referential() => current = next,
            _ => return PathResolution::Rejected { segment },
        }
    }
    PathResolution::NotFound { segment: 0 }
}

/// Resolve `path` starting on `entity`. `None` when missing, refused, or ambiguous.
pub fn find_referenced_property<M>(
    repository: &Repository,
    entity: EntityId,
    path: &[String],
    matcher: M,
) -> Option<PropertyRef>
where
    M: Fn(&EntityProperty, usize) -> bool,
{
    resolve_property_path(repository, entity, path, matcher).found()
}

#[cfg(test)]
mod tests {
    use metaed_model::{EntityKind, ModelBuilder, PropertyDecl, PropertyKind, resolve_references};

    use super::*;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    fn model() -> Repository {
        let mut repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .domain_entity("DomainEntityName1")
            .identity(PropertyKind::Integer, "IntegerIdentityName1")
            .domain_entity("DomainEntityName2")
            .identity(PropertyKind::Integer, "IntegerIdentityName2")
            .optional(PropertyKind::String, "Notes")
            .association("AssociationName1")
            .identity(PropertyKind::DomainEntity, "DomainEntityName1")
            .identity(PropertyKind::DomainEntity, "DomainEntityName2")
            .domain_entity("Holder")
            .identity(PropertyKind::Association, "AssociationName1")
            .property(PropertyDecl::new(PropertyKind::DomainEntity, "DomainEntityName1").role_name("Other"))
            .build()
            .unwrap();
        resolve_references(&mut repository);
        repository
    }

    fn entity(repository: &Repository, kind: EntityKind, name: &str) -> EntityId {
        repository.find_entity("EdFi", &[kind], name).unwrap()
    }

    #[test]
    fn test_property_on_current_entity() {
        let repository = model();
        let association = entity(&repository, EntityKind::Association, "AssociationName1");
        let found = find_referenced_property(
            &repository,
            association,
            &path(&["DomainEntityName2"]),
            match_all_identity_reference_properties,
        )
        .unwrap();
        assert_eq!(repository.property(found).meta_ed_name, "DomainEntityName2");
    }

    #[test]
    fn test_follows_reference_chain() {
        let repository = model();
        let holder = entity(&repository, EntityKind::DomainEntity, "Holder");
        let found = find_referenced_property(
            &repository,
            holder,
            &path(&["AssociationName1", "DomainEntityName1", "IntegerIdentityName1"]),
            match_all_identity_reference_properties,
        )
        .unwrap();
        assert_eq!(repository.property(found).meta_ed_name, "IntegerIdentityName1");
    }

    #[test]
    fn test_role_name_is_part_of_segment() {
        let repository = model();
        let holder = entity(&repository, EntityKind::DomainEntity, "Holder");
        assert!(
            find_referenced_property(
                &repository,
                holder,
                &path(&["OtherDomainEntityName1", "IntegerIdentityName1"]),
                match_all_but_first_as_identity_properties,
            )
            .is_some()
        );
        assert_eq!(
            resolve_property_path(
                &repository,
                holder,
                &path(&["OtherDomainEntityName1", "IntegerIdentityName1"]),
                match_all_identity_reference_properties,
            ),
            PathResolution::Rejected { segment: 0 }
        );
    }

    #[test]
    fn test_non_identity_leaf_is_rejected() {
        let repository = model();
        let holder = entity(&repository, EntityKind::DomainEntity, "Holder");
        assert_eq!(
            resolve_property_path(
                &repository,
                holder,
                &path(&["AssociationName1", "DomainEntityName2", "Notes"]),
                match_all_but_first_as_identity_properties,
            ),
            PathResolution::Rejected { segment: 2 }
        );
    }

    #[test]
    fn test_missing_segment() {
        let repository = model();
        let holder = entity(&repository, EntityKind::DomainEntity, "Holder");
        assert_eq!(
            resolve_property_path(
                &repository,
                holder,
                &path(&["AssociationName1", "Unknown"]),
                match_all_identity_reference_properties,
            ),
            PathResolution::NotFound { segment: 1 }
        );
    }

    #[test]
    fn test_duplicate_names_are_ambiguous() {
        let mut repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .domain_entity("Entity1")
            .identity(PropertyKind::Integer, "Prop1")
            .domain_entity("Entity2")
            .identity(PropertyKind::DomainEntity, "Entity1")
            .identity(PropertyKind::DomainEntity, "Entity1")
            .build()
            .unwrap();
        resolve_references(&mut repository);

        let entity2 = entity(&repository, EntityKind::DomainEntity, "Entity2");
        assert_eq!(
            find_referenced_property(
                &repository,
                entity2,
                &path(&["Entity1"]),
                match_all_identity_reference_properties
            ),
            None
        );
        assert_eq!(
            resolve_property_path(
                &repository,
                entity2,
                &path(&["Entity1"]),
                match_all_identity_reference_properties
            ),
            PathResolution::Ambiguous { segment: 0 }
        );
    }

    #[test]
    fn test_inherited_properties_are_searched() {
        let mut repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .abstract_entity("EducationOrganization")
            .identity(PropertyKind::Integer, "EducationOrganizationId")
            .domain_entity_subclass("School", "EducationOrganization")
            .build()
            .unwrap();
        resolve_references(&mut repository);

        let school = entity(&repository, EntityKind::DomainEntitySubclass, "School");
        assert!(
            find_referenced_property(
                &repository,
                school,
                &path(&["EducationOrganizationId"]),
                match_all_identity_reference_properties,
            )
            .is_some()
        );
    }
}
