use metaed_model::{EntityId, EntityKind, Repository, flattened_identity};
use metaed_pipeline::{Enhancer, EnhancerResult, MetaEdEnvironment, VersionGate};

use super::identity_json_paths::resource_entities;
use crate::{
    json_path::identity_json_path,
    model::{ApiSchemaEntity, normalize},
};

/// A person whose unique id secures the documents that identify them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Person {
    Student,
    Contact,
}

impl Person {
    fn entity_name(&self) -> &'static str {
        match self {
            Person::Student => "Student",
            Person::Contact => "Contact",
        }
    }

    fn unique_id(&self) -> &'static str {
        match self {
            Person::Student => "StudentUniqueId",
            Person::Contact => "ContactUniqueId",
        }
    }
}

/// The person's domain entity in the first core namespace.
pub fn person_entity(repository: &Repository, person: Person) -> Option<EntityId> {
    let core = repository.namespaces().find(|namespace| !namespace.is_extension)?;
    repository.find_entity(&core.name, &[EntityKind::DomainEntity], person.entity_name())
}

/// Identity JSON paths of `entity` that end at the core person's unique id,
/// reached without passing through a role-named reference.
pub fn person_securable_paths(repository: &Repository, entity: EntityId, person: Person) -> Vec<String> {
    let Some(person_id) = person_entity(repository, person) else {
        return Vec::new();
    };
    let mut paths: Vec<String> = flattened_identity(repository, entity)
        .into_iter()
        .filter(|element| {
            let leaf = repository.property(element.identity_property);
            let walked = &element.chain[..element.chain.len().saturating_sub(1)];
            element.identity_property.entity == person_id
                && leaf.full_property_name() == person.unique_id()
                && walked.iter().all(|p| !repository.property(*p).has_role_name())
        })
        .map(|element| identity_json_path(repository, &element))
        .collect();
    normalize(&mut paths);
    paths
}

pub struct StudentSecurableElementEnhancer;

impl Enhancer for StudentSecurableElementEnhancer {
    fn name(&self) -> &'static str {
        "StudentSecurableElementEnhancer"
    }

    fn enhance(&self, environment: &mut MetaEdEnvironment) -> EnhancerResult {
        let derived: Vec<_> = resource_entities(&environment.repository)
            .into_iter()
            .map(|id| (id, person_securable_paths(&environment.repository, id, Person::Student)))
            .collect();
        for (id, paths) in derived {
            environment
                .repository
                .entity_mut(id)
                .data
                .get_or_default::<ApiSchemaEntity>()
                .student_securable_elements = paths;
        }
        EnhancerResult::ok(self.name())
    }
}

/// Contacts exist from Data Standard 5.0 on.
pub struct ContactSecurableElementEnhancer;

impl Enhancer for ContactSecurableElementEnhancer {
    fn name(&self) -> &'static str {
        "ContactSecurableElementEnhancer"
    }

    fn gate(&self) -> Option<VersionGate> {
        Some(VersionGate::DataStandard(">=5.0.0"))
    }

    fn enhance(&self, environment: &mut MetaEdEnvironment) -> EnhancerResult {
        let derived: Vec<_> = resource_entities(&environment.repository)
            .into_iter()
            .map(|id| (id, person_securable_paths(&environment.repository, id, Person::Contact)))
            .collect();
        for (id, paths) in derived {
            environment
                .repository
                .entity_mut(id)
                .data
                .get_or_default::<ApiSchemaEntity>()
                .contact_securable_elements = paths;
        }
        EnhancerResult::ok(self.name())
    }
}

#[cfg(test)]
mod tests {
    use metaed_core::SemVer;
    use metaed_model::{ModelBuilder, PropertyDecl, PropertyKind, resolve_references};

    use super::*;

    fn repository() -> Repository {
        let mut repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .domain_entity("Student")
            .identity(PropertyKind::String, "StudentUniqueId")
            .domain_entity("Contact")
            .property(PropertyDecl::new(PropertyKind::String, "UniqueId").identity().role_name("Contact"))
            .domain_entity("School")
            .identity(PropertyKind::Integer, "SchoolId")
            .association("StudentSchoolAssociation")
            .identity(PropertyKind::DomainEntity, "Student")
            .identity(PropertyKind::DomainEntity, "School")
            .association("StudentContactAssociation")
            .identity(PropertyKind::DomainEntity, "Student")
            .identity(PropertyKind::DomainEntity, "Contact")
            .domain_entity("StudentMentor")
            .property(PropertyDecl::new(PropertyKind::DomainEntity, "Student").identity().role_name("Mentor"))
            .build()
            .unwrap();
        resolve_references(&mut repository);
        repository
    }

    fn find(repository: &Repository, kind: EntityKind, name: &str) -> EntityId {
        repository.find_entity("EdFi", &[kind], name).unwrap()
    }

    #[test]
    fn test_student_paths() {
        let repository = repository();
        let ssa = find(&repository, EntityKind::Association, "StudentSchoolAssociation");
        assert_eq!(
            person_securable_paths(&repository, ssa, Person::Student),
            vec!["$.studentReference.studentUniqueId"]
        );
        let student = find(&repository, EntityKind::DomainEntity, "Student");
        assert_eq!(
            person_securable_paths(&repository, student, Person::Student),
            vec!["$.studentUniqueId"]
        );
    }

    #[test]
    fn test_role_named_reference_is_not_securable() {
        let repository = repository();
        let mentor = find(&repository, EntityKind::DomainEntity, "StudentMentor");
        assert!(person_securable_paths(&repository, mentor, Person::Student).is_empty());
    }

    #[test]
    fn test_contact_unique_id_uses_role_name() {
        let repository = repository();
        let contact = find(&repository, EntityKind::DomainEntity, "Contact");
        assert_eq!(
            person_securable_paths(&repository, contact, Person::Contact),
            vec!["$.contactUniqueId"]
        );
        let association = find(&repository, EntityKind::Association, "StudentContactAssociation");
        assert_eq!(
            person_securable_paths(&repository, association, Person::Contact),
            vec!["$.contactReference.contactUniqueId"]
        );
    }

    #[test]
    fn test_extension_student_is_not_securable() {
        let mut repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .domain_entity("Student")
            .identity(PropertyKind::String, "StudentUniqueId")
            .extension_namespace("Sample", "Sample")
            .domain_entity("Student")
            .identity(PropertyKind::String, "StudentUniqueId")
            .association("StudentBusAssociation")
            .identity(PropertyKind::DomainEntity, "Student")
            .identity(PropertyKind::String, "BusId")
            .build()
            .unwrap();
        resolve_references(&mut repository);

        for name in ["Student", "StudentBusAssociation"] {
            let id = repository
                .find_entity("Sample", &[EntityKind::DomainEntity, EntityKind::Association], name)
                .unwrap();
            assert!(person_securable_paths(&repository, id, Person::Student).is_empty());
        }
        let core_student = find(&repository, EntityKind::DomainEntity, "Student");
        assert_eq!(
            person_securable_paths(&repository, core_student, Person::Student),
            vec!["$.studentUniqueId"]
        );
    }

    #[test]
    fn test_contact_enhancer_is_gated() {
        let gate = ContactSecurableElementEnhancer.gate().unwrap();
        let environment = MetaEdEnvironment::new(Repository::new(), SemVer::new(4, 0, 0));
        assert!(!gate.is_satisfied(&environment));
        let environment = MetaEdEnvironment::new(Repository::new(), SemVer::new(5, 0, 0));
        assert!(gate.is_satisfied(&environment));
    }

    #[test]
    fn test_enhancer_fills_slots() {
        let mut environment = MetaEdEnvironment::new(repository(), SemVer::new(5, 0, 0));
        assert!(StudentSecurableElementEnhancer.enhance(&mut environment).success);
        let repository = &environment.repository;
        let ssa = find(repository, EntityKind::Association, "StudentSchoolAssociation");
        let slot = repository.entity(ssa).data.get::<ApiSchemaEntity>().unwrap();
        assert_eq!(slot.student_securable_elements, vec!["$.studentReference.studentUniqueId"]);
    }
}
