//! Subclass identity rename rules.

use metaed_model::{EntityId, Namespace, Repository};
use metaed_pipeline::{MetaEdEnvironment, ValidationFailure, Validator};

use super::entities_in_namespaces;

/// An identity rename is only meaningful on a subclass.
pub struct IdentityRenameExistsOnlyIfIdentityOnBase;

impl Validator for IdentityRenameExistsOnlyIfIdentityOnBase {
    fn name(&self) -> &'static str {
        "IdentityRenameExistsOnlyIfIdentityOnBase"
    }

    fn validate(&self, environment: &MetaEdEnvironment, namespaces: &[&Namespace]) -> Vec<ValidationFailure> {
        let repository = &environment.repository;
        let mut failures = Vec::new();
        for entity_id in entities_in_namespaces(repository, namespaces) {
            let entity = repository.entity(entity_id);
            if entity.kind.is_subclass() {
                continue;
            }
            for property in entity.properties.iter().filter(|p| p.is_identity_rename) {
                failures.push(ValidationFailure::error(
                    self.name(),
                    format!(
                        "'renames identity property' is invalid for property {} on {} '{}'. 'renames identity property' is only valid for properties on subclasses.",
                        property.meta_ed_name, entity.kind, entity.meta_ed_name
                    ),
                    Some(&property.source_map),
                ));
            }
        }
        failures
    }
}

/// The renamed property must be an identity property of the resolved base.
pub struct IdentityRenameMustMatchIdentityPropertyInBase;

impl IdentityRenameMustMatchIdentityPropertyInBase {
    fn base_identity_names(repository: &Repository, base: EntityId) -> Vec<String> {
        repository
            .identity_properties(base)
            .into_iter()
            .map(|p| repository.property(p).meta_ed_name.clone())
            .collect()
    }
}

impl Validator for IdentityRenameMustMatchIdentityPropertyInBase {
    fn name(&self) -> &'static str {
        "IdentityRenameMustMatchIdentityPropertyInBase"
    }

    fn validate(&self, environment: &MetaEdEnvironment, namespaces: &[&Namespace]) -> Vec<ValidationFailure> {
        let repository = &environment.repository;
        let mut failures = Vec::new();
        for entity_id in entities_in_namespaces(repository, namespaces) {
            let entity = repository.entity(entity_id);
            let Some(base) = entity.base_entity.filter(|_| entity.kind.is_subclass()) else {
                continue;
            };
            let base_identity = Self::base_identity_names(repository, base);
            for property in entity.properties.iter().filter(|p| p.is_identity_rename) {
                let base_key = property.base_key_name.as_deref().unwrap_or_default();
                if base_identity.iter().any(|name| name == base_key) {
                    continue;
                }
                failures.push(ValidationFailure::error(
                    self.name(),
                    format!(
                        "{} '{}' based on '{}' tries to rename {} which is not part of the identity.",
                        entity.kind,
                        entity.meta_ed_name,
                        repository.entity(base).meta_ed_name,
                        base_key
                    ),
                    Some(&property.source_map),
                ));
            }
        }
        failures
    }
}

/// A subclass may rename at most one base identity property.
pub struct IdentityRenameMustExistNoMoreThanOnce;

impl Validator for IdentityRenameMustExistNoMoreThanOnce {
    fn name(&self) -> &'static str {
        "IdentityRenameMustExistNoMoreThanOnce"
    }

    fn validate(&self, environment: &MetaEdEnvironment, namespaces: &[&Namespace]) -> Vec<ValidationFailure> {
        let repository = &environment.repository;
        let mut failures = Vec::new();
        for entity_id in entities_in_namespaces(repository, namespaces) {
            let entity = repository.entity(entity_id);
            if !entity.kind.is_subclass() {
                continue;
            }
            let renames: Vec<_> = entity.properties.iter().filter(|p| p.is_identity_rename).collect();
            if renames.len() < 2 {
                continue;
            }
            let names = renames
                .iter()
                .map(|p| p.meta_ed_name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            failures.push(ValidationFailure::error(
                self.name(),
                format!(
                    "{} '{}' based on '{}' has multiple properties with a property role of 'renames identity property'. The properties are: {}.",
                    entity.kind,
                    entity.meta_ed_name,
                    entity.base_entity_name.as_deref().unwrap_or_default(),
                    names
                ),
                Some(&entity.source_map),
            ));
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use metaed_core::SemVer;
    use metaed_model::{ModelBuilder, PropertyDecl, PropertyKind, resolve_references};

    use super::*;

    fn environment(builder: ModelBuilder) -> MetaEdEnvironment {
        let mut repository = builder.build().unwrap();
        resolve_references(&mut repository);
        MetaEdEnvironment::new(repository, SemVer::new(5, 0, 0))
    }

    fn run(validator: &dyn Validator, environment: &MetaEdEnvironment) -> Vec<ValidationFailure> {
        let namespaces: Vec<&Namespace> = environment.repository.namespaces().collect();
        validator.validate(environment, &namespaces)
    }

    fn school_model() -> ModelBuilder {
        ModelBuilder::new()
            .core_namespace("EdFi")
            .abstract_entity("EducationOrganization")
            .identity(PropertyKind::Integer, "EducationOrganizationId")
    }

    #[test]
    fn test_valid_rename() {
        let environment = environment(
            school_model()
                .domain_entity_subclass("School", "EducationOrganization")
                .property(PropertyDecl::new(PropertyKind::Integer, "SchoolId").identity_rename("EducationOrganizationId")),
        );
        assert!(run(&IdentityRenameExistsOnlyIfIdentityOnBase, &environment).is_empty());
        assert!(run(&IdentityRenameMustMatchIdentityPropertyInBase, &environment).is_empty());
        assert!(run(&IdentityRenameMustExistNoMoreThanOnce, &environment).is_empty());
    }

    #[test]
    fn test_rename_outside_subclass() {
        let environment = environment(
            school_model()
                .domain_entity("Program")
                .property(PropertyDecl::new(PropertyKind::Integer, "ProgramId").identity_rename("EducationOrganizationId")),
        );
        let failures = run(&IdentityRenameExistsOnlyIfIdentityOnBase, &environment);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].validator_name, "IdentityRenameExistsOnlyIfIdentityOnBase");
    }

    #[test]
    fn test_rename_of_non_identity_property() {
        let environment = environment(
            school_model()
                .domain_entity_subclass("School", "EducationOrganization")
                .property(PropertyDecl::new(PropertyKind::Integer, "SchoolId").identity_rename("NameOfInstitution")),
        );
        let failures = run(&IdentityRenameMustMatchIdentityPropertyInBase, &environment);
        insta::assert_snapshot!(failures[0].to_string(), @"error[IdentityRenameMustMatchIdentityPropertyInBase]: domainEntitySubclass 'School' based on 'EducationOrganization' tries to rename NameOfInstitution which is not part of the identity. (at EdFi.metaed:5:4)");
    }

    #[test]
    fn test_multiple_renames() {
        let environment = environment(
            school_model()
                .identity(PropertyKind::Integer, "Code")
                .domain_entity_subclass("School", "EducationOrganization")
                .property(PropertyDecl::new(PropertyKind::Integer, "SchoolId").identity_rename("EducationOrganizationId"))
                .property(PropertyDecl::new(PropertyKind::Integer, "SchoolCode").identity_rename("Code")),
        );
        let failures = run(&IdentityRenameMustExistNoMoreThanOnce, &environment);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].message.ends_with("The properties are: SchoolId, SchoolCode."));
    }
}
