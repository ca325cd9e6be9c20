use std::collections::HashMap;

use metaed_model::{Namespace, SourceMap};
use metaed_pipeline::{MetaEdEnvironment, NamespaceScope, ValidationFailure, Validator};

use super::entities_in_namespaces;

/// MetaEdIds are unique across entities and properties of the data standard.
///
/// The first declaration of an id wins; every later one is reported.
pub struct MustNotDuplicateMetaEdId;

impl Validator for MustNotDuplicateMetaEdId {
    fn name(&self) -> &'static str {
        "MustNotDuplicateMetaEdId"
    }

    fn scope(&self) -> NamespaceScope {
        NamespaceScope::CoreOnly
    }

    fn validate(&self, environment: &MetaEdEnvironment, namespaces: &[&Namespace]) -> Vec<ValidationFailure> {
        let repository = &environment.repository;
        let validator_name = self.name();
        let mut first_seen: HashMap<String, String> = HashMap::new();
        let mut failures = Vec::new();

        let mut check = |meta_ed_id: Option<&str>, label: String, source_map: &SourceMap| {
            let Some(meta_ed_id) = meta_ed_id else {
                return;
            };
            match first_seen.get(meta_ed_id) {
                Some(first) => failures.push(ValidationFailure::error(
                    validator_name,
                    format!("MetaEdId '{meta_ed_id}' on {label} is already used by {first}."),
                    Some(source_map),
                )),
                None => {
                    first_seen.insert(meta_ed_id.to_string(), label);
                }
            }
        };

        for entity_id in entities_in_namespaces(repository, namespaces) {
            let entity = repository.entity(entity_id);
            check(
                entity.meta_ed_id.as_deref(),
                format!("{} '{}'", entity.kind, entity.meta_ed_name),
                &entity.source_map,
            );
            for property in &entity.properties {
                check(
                    property.meta_ed_id.as_deref(),
                    format!("property '{}' on '{}'", property.full_property_name(), entity.meta_ed_name),
                    &property.source_map,
                );
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use metaed_core::SemVer;
    use metaed_model::{ModelBuilder, PropertyDecl, PropertyKind};

    use super::*;

    #[test]
    fn test_duplicates_reported_after_first() {
        let repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .domain_entity("Student")
            .meta_ed_id("100")
            .property(PropertyDecl::new(PropertyKind::String, "StudentUniqueId").identity().meta_ed_id("100"))
            .domain_entity("School")
            .meta_ed_id("100")
            .build()
            .unwrap();
        let environment = MetaEdEnvironment::new(repository, SemVer::new(5, 0, 0));
        let namespaces: Vec<&Namespace> = environment.repository.namespaces().collect();

        let failures = MustNotDuplicateMetaEdId.validate(&environment, &namespaces);
        let messages: Vec<String> = failures.iter().map(ToString::to_string).collect();
        insta::assert_debug_snapshot!(messages, @r#"
        [
            "error[MustNotDuplicateMetaEdId]: MetaEdId '100' on property 'StudentUniqueId' on 'Student' is already used by domainEntity 'Student'. (at EdFi.metaed:3:4)",
            "error[MustNotDuplicateMetaEdId]: MetaEdId '100' on domainEntity 'School' is already used by domainEntity 'Student'. (at EdFi.metaed:4:2)",
        ]
        "#);
    }

    #[test]
    fn test_extension_namespaces_are_out_of_scope() {
        let repository = ModelBuilder::new()
            .core_namespace("EdFi")
            .extension_namespace("Sample", "Sample")
            .build()
            .unwrap();
        let scope = MustNotDuplicateMetaEdId.scope();
        assert!(scope.includes(repository.namespace("EdFi").unwrap()));
        assert!(!scope.includes(repository.namespace("Sample").unwrap()));
    }
}
