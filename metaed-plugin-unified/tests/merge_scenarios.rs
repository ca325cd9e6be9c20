//! Merge directives run through the full pipeline.

use metaed_core::SemVer;
use metaed_model::{EntityKind, ModelBuilder, PropertyDecl, PropertyKind, Repository};
use metaed_pipeline::{CompilationContext, MetaEdEnvironment, Pipeline};
use metaed_plugin_unified::{UnifiedPlugin, find_referenced_property, match_all_identity_reference_properties};

fn compile(repository: Repository) -> CompilationContext {
    Pipeline::new()
        .plugin(UnifiedPlugin)
        .run(MetaEdEnvironment::new(repository, SemVer::new(5, 0, 0)))
        .unwrap()
}

fn messages(ctx: &CompilationContext) -> Vec<String> {
    ctx.failures.iter().map(ToString::to_string).collect()
}

#[test]
fn test_valid_merge_has_no_failures() {
    let repository = ModelBuilder::new()
        .core_namespace("EdFi")
        .domain_entity("Entity1")
        .identity(PropertyKind::Integer, "Prop1")
        .domain_entity("Entity2")
        .identity(PropertyKind::Integer, "Prop1")
        .property(
            PropertyDecl::new(PropertyKind::DomainEntity, "Entity1")
                .identity()
                .merge("Entity1.Prop1", "Prop1"),
        )
        .build()
        .unwrap();

    let ctx = compile(repository);
    assert!(ctx.failures.is_empty(), "{:#?}", messages(&ctx));
}

#[test]
fn test_merge_across_association_chain() {
    let repository = ModelBuilder::new()
        .core_namespace("EdFi")
        .domain_entity("School")
        .identity(PropertyKind::Integer, "SchoolId")
        .domain_entity("Student")
        .identity(PropertyKind::String, "StudentUniqueId")
        .association("StudentSchoolAssociation")
        .identity(PropertyKind::DomainEntity, "Student")
        .identity(PropertyKind::DomainEntity, "School")
        .domain_entity("Section")
        .identity(PropertyKind::DomainEntity, "School")
        .identity(PropertyKind::String, "SectionIdentifier")
        .association("StudentSectionAssociation")
        .property(
            PropertyDecl::new(PropertyKind::Association, "StudentSchoolAssociation")
                .identity()
                .merge("StudentSchoolAssociation.School", "Section.School"),
        )
        .identity(PropertyKind::DomainEntity, "Section")
        .build()
        .unwrap();

    let ctx = compile(repository);
    assert!(ctx.failures.is_empty(), "{:#?}", messages(&ctx));

    let repository = &ctx.environment.repository;
    let owner = repository
        .find_entity("EdFi", &[EntityKind::Association], "StudentSectionAssociation")
        .unwrap();
    let merge = &repository.entity(owner).properties[0].merge_directives[0];
    let source = repository.property(merge.source_property.unwrap());
    let target = repository.property(merge.target_property.unwrap());
    assert_eq!(source.referenced_entity, target.referenced_entity);
}

#[test]
fn test_ambiguous_path_cannot_be_verified() {
    let repository = ModelBuilder::new()
        .core_namespace("EdFi")
        .domain_entity("Entity1")
        .identity(PropertyKind::Integer, "Prop1")
        .domain_entity("Entity2")
        .identity(PropertyKind::DomainEntity, "Entity1")
        .property(
            PropertyDecl::new(PropertyKind::DomainEntity, "Entity1")
                .identity()
                .merge("Entity1.Prop1", "Entity1.Prop1"),
        )
        .build()
        .unwrap();

    let ctx = compile(repository);

    let repository = &ctx.environment.repository;
    let entity2 = repository
        .find_entity("EdFi", &[EntityKind::DomainEntity], "Entity2")
        .unwrap();
    let path = vec!["Entity1".to_string()];
    assert_eq!(
        find_referenced_property(repository, entity2, &path, match_all_identity_reference_properties),
        None
    );

    assert_eq!(ctx.error_count(), 0);
    insta::assert_debug_snapshot!(messages(&ctx), @r#"
    [
        "warning[SourcePropertyPathMustExist]: Merge source path 'Entity1.Prop1' cannot be verified: 'Entity1' matches more than one property. (at EdFi.metaed:7:6)",
        "warning[TargetPropertyPathMustExist]: Merge target path 'Entity1.Prop1' cannot be verified: 'Entity1' matches more than one property. (at EdFi.metaed:7:6)",
    ]
    "#);
}

#[test]
fn test_bad_merge_diagnostics_in_run_order() {
    let repository = ModelBuilder::new()
        .core_namespace("EdFi")
        .domain_entity("Entity1")
        .identity(PropertyKind::Integer, "Prop1")
        .optional(PropertyKind::Integer, "Prop2")
        .domain_entity("Entity2")
        .identity(PropertyKind::String, "Prop1")
        .property(
            PropertyDecl::new(PropertyKind::DomainEntity, "Entity1")
                .identity()
                .merge("Other.Prop1", "Prop1")
                .merge("Entity1.Prop2", "Prop1")
                .merge("Entity1.Prop1", "Prop1"),
        )
        .build()
        .unwrap();

    let ctx = compile(repository);
    insta::assert_debug_snapshot!(messages(&ctx), @r#"
    [
        "error[MergeDirectiveMustStartSourcePathWithPropertyName]: Merge directive source path 'Other.Prop1' must start with the name of the property it is declared on, 'Entity1'. (at EdFi.metaed:8:6)",
        "error[SourcePropertyPathMustExist]: Merge source path 'Other.Prop1' does not exist: no property named 'Other'. (at EdFi.metaed:8:6)",
        "error[SourcePropertyPathMustExist]: Merge source path 'Entity1.Prop2' does not exist: 'Prop2' is not an identity property that can be followed. (at EdFi.metaed:9:6)",
        "error[SourcePropertyAndTargetPropertyMustMatch]: The merge paths 'Entity1.Prop1' and 'Prop1' do not correspond to the same entity type: integer 'Prop1' cannot be merged with string 'Prop1'. (at EdFi.metaed:10:6)",
    ]
    "#);
}

#[test]
fn test_merge_between_subclass_and_base_references() {
    let repository = ModelBuilder::new()
        .core_namespace("EdFi")
        .abstract_entity("EducationOrganization")
        .identity(PropertyKind::Integer, "EducationOrganizationId")
        .domain_entity_subclass("School", "EducationOrganization")
        .property(PropertyDecl::new(PropertyKind::Integer, "SchoolId").identity_rename("EducationOrganizationId"))
        .domain_entity("Course")
        .identity(PropertyKind::DomainEntity, "EducationOrganization")
        .identity(PropertyKind::String, "CourseCode")
        .domain_entity("CourseOffering")
        .identity(PropertyKind::DomainEntity, "School")
        .property(
            PropertyDecl::new(PropertyKind::DomainEntity, "Course")
                .identity()
                .merge("Course.EducationOrganization", "School"),
        )
        .build()
        .unwrap();

    let ctx = compile(repository);
    assert!(ctx.failures.is_empty(), "{:#?}", messages(&ctx));
}
