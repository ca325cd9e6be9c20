use metaed_model::{EntityKind, Namespace};
use metaed_pipeline::{MetaEdEnvironment, ValidationFailure, Validator};

fn entities_without_identity(
    validator_name: &str,
    kind: EntityKind,
    environment: &MetaEdEnvironment,
    namespaces: &[&Namespace],
) -> Vec<ValidationFailure> {
    let repository = &environment.repository;
    namespaces
        .iter()
        .flat_map(|namespace| repository.entities_in(&namespace.name, &[kind]))
        .filter(|id| repository.identity_properties(*id).is_empty())
        .map(|id| {
            let entity = repository.entity(id);
            ValidationFailure::error(
                validator_name,
                format!("{} '{}' does not have an identity specified.", entity.kind, entity.meta_ed_name),
                Some(&entity.source_map),
            )
        })
        .collect()
}

pub struct DomainEntityMustContainAnIdentity;

impl Validator for DomainEntityMustContainAnIdentity {
    fn name(&self) -> &'static str {
        "DomainEntityMustContainAnIdentity"
    }

    fn validate(&self, environment: &MetaEdEnvironment, namespaces: &[&Namespace]) -> Vec<ValidationFailure> {
        entities_without_identity(self.name(), EntityKind::DomainEntity, environment, namespaces)
    }
}

pub struct AbstractEntityMustContainAnIdentity;

impl Validator for AbstractEntityMustContainAnIdentity {
    fn name(&self) -> &'static str {
        "AbstractEntityMustContainAnIdentity"
    }

    fn validate(&self, environment: &MetaEdEnvironment, namespaces: &[&Namespace]) -> Vec<ValidationFailure> {
        entities_without_identity(self.name(), EntityKind::AbstractEntity, environment, namespaces)
    }
}
