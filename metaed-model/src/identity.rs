//! Flattened identity closure.

use std::collections::HashSet;

use crate::{EntityId, PropertyKind, PropertyRef, Repository};

/// One scalar element of an entity's document identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedIdentityProperty {
    /// The scalar property at the end of the chain
    pub identity_property: PropertyRef,
    /// Properties walked from the entity's own identity property down to the leaf
    pub chain: Vec<PropertyRef>,
    /// Full property names along the chain, dot separated
    pub property_path: String,
}

impl FlattenedIdentityProperty {
    /// The entity's own identity property this element is reached through.
    pub fn top_level_property(&self) -> PropertyRef {
        self.chain[0]
    }
}

/// Every scalar identity element of an entity, in identity declaration order.
///
/// References, commons and choices that are part of the identity are
/// expanded into the identity of their target. Unresolved references
/// contribute nothing and reference cycles are cut.
pub fn flattened_identity(repository: &Repository, entity: EntityId) -> Vec<FlattenedIdentityProperty> {
    let mut result = Vec::new();
    let mut visiting = HashSet::from([entity]);
    for property in repository.identity_properties(entity) {
        walk(repository, property, &mut vec![property], &mut visiting, &mut result);
    }
    result
}

fn walk(
    repository: &Repository,
    property: PropertyRef,
    chain: &mut Vec<PropertyRef>,
    visiting: &mut HashSet<EntityId>,
    result: &mut Vec<FlattenedIdentityProperty>,
) {
    let current = repository.property(property);
    let expands = current.kind.is_referential()
        || matches!(
            current.kind,
            PropertyKind::Common | PropertyKind::InlineCommon | PropertyKind::Choice
        );

    if !expands {
        result.push(FlattenedIdentityProperty {
            identity_property: property,
            chain: chain.clone(),
            property_path: chain
                .iter()
                .map(|p| repository.property(*p).full_property_name())
                .collect::<Vec<_>>()
                .join("."),
        });
        return;
    }

    let Some(target) = current.referenced_entity else {
        return;
    };
    if !visiting.insert(target) {
        return;
    }
    for next in repository.identity_properties(target) {
        chain.push(next);
        walk(repository, next, chain, visiting, result);
        chain.pop();
    }
    visiting.remove(&target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityKind, ModelBuilder, PropertyDecl, resolve_references};

    fn paths(repository: &Repository, entity: EntityId) -> Vec<String> {
        flattened_identity(repository, entity)
            .into_iter()
            .map(|p| p.property_path)
            .collect()
    }

    #[test]
    fn test_reference_chain_is_expanded() {
        let mut repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .domain_entity("Student")
            .identity(PropertyKind::String, "StudentUniqueId")
            .domain_entity("School")
            .identity(PropertyKind::Integer, "SchoolId")
            .association("StudentSchoolAssociation")
            .identity(PropertyKind::DomainEntity, "Student")
            .identity(PropertyKind::DomainEntity, "School")
            .identity(PropertyKind::Date, "EntryDate")
            .build()
            .unwrap();
        resolve_references(&mut repository);

        let ssa = repository
            .find_entity("EdFi", &[EntityKind::Association], "StudentSchoolAssociation")
            .unwrap();
        assert_eq!(
            paths(&repository, ssa),
            vec!["Student.StudentUniqueId", "School.SchoolId", "EntryDate"]
        );
    }

    #[test]
    fn test_subclass_rename_replaces_base_key() {
        let mut repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .abstract_entity("EducationOrganization")
            .identity(PropertyKind::Integer, "EducationOrganizationId")
            .domain_entity_subclass("School", "EducationOrganization")
            .property(
                PropertyDecl::new(PropertyKind::Integer, "SchoolId")
                    .identity_rename("EducationOrganizationId"),
            )
            .build()
            .unwrap();
        resolve_references(&mut repository);

        let school = repository
            .find_entity("EdFi", &[EntityKind::DomainEntitySubclass], "School")
            .unwrap();
        assert_eq!(paths(&repository, school), vec!["SchoolId"]);
    }

    #[test]
    fn test_cycles_and_unresolved_are_cut() {
        let mut repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .domain_entity("A")
            .identity(PropertyKind::DomainEntity, "B")
            .identity(PropertyKind::DomainEntity, "Missing")
            .domain_entity("B")
            .identity(PropertyKind::DomainEntity, "A")
            .identity(PropertyKind::String, "Code")
            .build()
            .unwrap();
        resolve_references(&mut repository);

        let a = repository
            .find_entity("EdFi", &[EntityKind::DomainEntity], "A")
            .unwrap();
        assert_eq!(paths(&repository, a), vec!["B.Code"]);
    }
}
