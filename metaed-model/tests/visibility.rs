//! Namespace visibility and shadowing during reference resolution.

use metaed_model::{EntityKind, ModelBuilder, PropertyKind, Repository, resolve_references};

fn find(repository: &Repository, namespace: &str, name: &str) -> metaed_model::EntityId {
    repository
        .find_entity(namespace, &[EntityKind::DomainEntity], name)
        .expect("entity not declared")
}

#[test]
fn test_sibling_extension_is_not_visible() {
    let mut repository = ModelBuilder::new()
        .core_namespace("EdFi")
        .domain_entity("Student")
        .identity(PropertyKind::String, "StudentUniqueId")
        .extension_namespace("Sibling", "Sibling")
        .domain_entity("Bus")
        .identity(PropertyKind::String, "BusId")
        .extension_namespace("Sample", "Sample")
        .domain_entity("Route")
        .identity(PropertyKind::String, "RouteId")
        .required(PropertyKind::DomainEntity, "Bus")
        .build()
        .unwrap();

    let unresolved = resolve_references(&mut repository);

    let route = find(&repository, "Sample", "Route");
    assert_eq!(repository.entity(route).properties[1].referenced_entity, None);
    let lines: Vec<String> = unresolved
        .iter()
        .map(|u| format!("{} {}: {}", u.source_map, u.validator_name, u.message))
        .collect();
    insta::assert_snapshot!(
        lines.join("\n"),
        @"Sample.metaed:10:4 DomainEntityPropertyMustMatchADomainEntity: domainEntity property 'Bus' on domainEntity 'Route' does not match any declared domainEntity or domainEntitySubclass or abstractEntity visible from namespace 'Sample'"
    );
}

#[test]
fn test_downstream_extension_is_not_visible_from_core() {
    let mut repository = ModelBuilder::new()
        .core_namespace("EdFi")
        .domain_entity("Student")
        .required(PropertyKind::DomainEntity, "Bus")
        .extension_namespace("Sample", "Sample")
        .domain_entity("Bus")
        .build()
        .unwrap();

    let unresolved = resolve_references(&mut repository);
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].namespace, "EdFi");
}

#[test]
fn test_core_is_visible_from_extension() {
    let mut repository = ModelBuilder::new()
        .core_namespace("EdFi")
        .domain_entity("School")
        .extension_namespace("Sample", "Sample")
        .domain_entity("Bus")
        .required(PropertyKind::DomainEntity, "School")
        .build()
        .unwrap();

    assert!(resolve_references(&mut repository).is_empty());
    let bus = find(&repository, "Sample", "Bus");
    let school = find(&repository, "EdFi", "School");
    assert_eq!(repository.entity(bus).properties[0].referenced_entity, Some(school));
}

#[test]
fn test_local_declaration_shadows_core() {
    let mut repository = ModelBuilder::new()
        .core_namespace("EdFi")
        .domain_entity("X")
        .extension_namespace("Sample", "Sample")
        .domain_entity("X")
        .domain_entity("Y")
        .required(PropertyKind::DomainEntity, "X")
        .build()
        .unwrap();

    assert!(resolve_references(&mut repository).is_empty());
    let y = find(&repository, "Sample", "Y");
    let local_x = find(&repository, "Sample", "X");
    assert_eq!(repository.entity(y).properties[0].referenced_entity, Some(local_x));
}

#[test]
fn test_explicit_qualifier_bypasses_shadowing() {
    let mut repository = ModelBuilder::new()
        .core_namespace("EdFi")
        .domain_entity("X")
        .extension_namespace("Sample", "Sample")
        .domain_entity("X")
        .domain_entity("Y")
        .required(PropertyKind::DomainEntity, "EdFi.X")
        .build()
        .unwrap();

    assert!(resolve_references(&mut repository).is_empty());
    let y = find(&repository, "Sample", "Y");
    let core_x = find(&repository, "EdFi", "X");
    assert_eq!(repository.entity(y).properties[0].referenced_entity, Some(core_x));
}

#[test]
fn test_transitive_dependency_chain() {
    use metaed_model::NamespaceDecl;

    let repository = ModelBuilder::new()
        .core_namespace("EdFi")
        .namespace(NamespaceDecl::extension("Tpdm", "TPDM"))
        .namespace(NamespaceDecl::extension("Sample", "Sample").depends_on("Tpdm"))
        .build()
        .unwrap();

    assert_eq!(repository.dependency_chain("Sample"), vec!["Tpdm", "EdFi"]);
    assert!(repository.is_visible("Sample", "EdFi"));
    assert!(!repository.is_visible("EdFi", "Sample"));
}
