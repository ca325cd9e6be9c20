//! Merge directive rules.
//!
//! The enhancer links merge paths only when they resolve cleanly. These
//! validators re-run the path resolver to say *why* a path did not resolve.
//! Ambiguous paths cannot be verified and are reported as warnings.

use metaed_model::{EntityProperty, MergeDirective, Namespace, PropertyRef, Repository};
use metaed_pipeline::{MetaEdEnvironment, ValidationFailure, Validator};

use super::entities_in_namespaces;
use crate::path::{
    PathResolution, match_all_but_first_as_identity_properties,
    match_all_identity_reference_properties, resolve_property_path,
};

/// Every (property, merge) pair declared in the given namespaces, in declaration order.
fn merges<'r>(
    repository: &'r Repository,
    namespaces: &[&Namespace],
) -> Vec<(PropertyRef, &'r EntityProperty, &'r MergeDirective)> {
    let mut result = Vec::new();
    for entity_id in entities_in_namespaces(repository, namespaces) {
        for (index, property) in repository.entity(entity_id).properties.iter().enumerate() {
            for merge in &property.merge_directives {
                result.push((PropertyRef::new(entity_id, index), property, merge));
            }
        }
    }
    result
}

pub struct MergeDirectiveMustStartSourcePathWithPropertyName;

impl Validator for MergeDirectiveMustStartSourcePathWithPropertyName {
    fn name(&self) -> &'static str {
        "MergeDirectiveMustStartSourcePathWithPropertyName"
    }

    fn validate(&self, environment: &MetaEdEnvironment, namespaces: &[&Namespace]) -> Vec<ValidationFailure> {
        let repository = &environment.repository;
        merges(repository, namespaces)
            .into_iter()
            .filter(|(_, property, merge)| {
                merge.source_property_path.first() != Some(&property.full_property_name())
            })
            .map(|(_, property, merge)| {
                ValidationFailure::error(
                    self.name(),
                    format!(
                        "Merge directive source path '{}' must start with the name of the property it is declared on, '{}'.",
                        merge.source_path_string(),
                        property.full_property_name()
                    ),
                    Some(&merge.source_map),
                )
            })
            .collect()
    }
}

fn path_failure(
    validator_name: &str,
    side: &str,
    path: &[String],
    resolution: PathResolution,
    merge: &MergeDirective,
) -> Option<ValidationFailure> {
    let describe = |segment: usize| path.get(segment).map(String::as_str).unwrap_or_default();
    let joined = path.join(".");
    match resolution {
        PathResolution::Found(_) => None,
        PathResolution::NotFound { segment } => Some(ValidationFailure::error(
            validator_name,
            format!("Merge {side} path '{joined}' does not exist: no property named '{}'.", describe(segment)),
            Some(&merge.source_map),
        )),
        PathResolution::Rejected { segment } => Some(ValidationFailure::error(
            validator_name,
            format!(
                "Merge {side} path '{joined}' does not exist: '{}' is not an identity property that can be followed.",
                describe(segment)
            ),
            Some(&merge.source_map),
        )),
        PathResolution::Ambiguous { segment } => Some(ValidationFailure::warning(
            validator_name,
            format!(
                "Merge {side} path '{joined}' cannot be verified: '{}' matches more than one property.",
                describe(segment)
            ),
            Some(&merge.source_map),
        )),
    }
}

pub struct SourcePropertyPathMustExist;

impl Validator for SourcePropertyPathMustExist {
    fn name(&self) -> &'static str {
        "SourcePropertyPathMustExist"
    }

    fn validate(&self, environment: &MetaEdEnvironment, namespaces: &[&Namespace]) -> Vec<ValidationFailure> {
        let repository = &environment.repository;
        merges(repository, namespaces)
            .into_iter()
            .filter_map(|(owner, _, merge)| {
                let resolution = resolve_property_path(
                    repository,
                    owner.entity,
                    &merge.source_property_path,
                    match_all_but_first_as_identity_properties,
                );
                path_failure(self.name(), "source", &merge.source_property_path, resolution, merge)
            })
            .collect()
    }
}

pub struct TargetPropertyPathMustExist;

impl Validator for TargetPropertyPathMustExist {
    fn name(&self) -> &'static str {
        "TargetPropertyPathMustExist"
    }

    fn validate(&self, environment: &MetaEdEnvironment, namespaces: &[&Namespace]) -> Vec<ValidationFailure> {
        let repository = &environment.repository;
        merges(repository, namespaces)
            .into_iter()
            .filter_map(|(owner, _, merge)| {
                let resolution = resolve_property_path(
                    repository,
                    owner.entity,
                    &merge.target_property_path,
                    match_all_identity_reference_properties,
                );
                path_failure(self.name(), "target", &merge.target_property_path, resolution, merge)
            })
            .collect()
    }
}

/// Source and target of a resolved merge must carry the same kind of value.
///
/// References must point at the same entity, or at entities related through
/// a subclass chain in either direction. Merges whose paths did not resolve
/// are skipped; the path validators report those.
pub struct SourcePropertyAndTargetPropertyMustMatch;

impl SourcePropertyAndTargetPropertyMustMatch {
    fn compatible(repository: &Repository, source: &EntityProperty, target: &EntityProperty) -> bool {
        if source.kind != target.kind {
            return false;
        }
        if !source.kind.is_reference() {
            return true;
        }
        match (source.referenced_entity, target.referenced_entity) {
            (Some(a), Some(b)) => {
                repository.is_same_or_subclass_of(a, b) || repository.is_same_or_subclass_of(b, a)
            }
            // Unresolved references were already reported by the resolve phase.
            _ => true,
        }
    }
}

impl Validator for SourcePropertyAndTargetPropertyMustMatch {
    fn name(&self) -> &'static str {
        "SourcePropertyAndTargetPropertyMustMatch"
    }

    fn validate(&self, environment: &MetaEdEnvironment, namespaces: &[&Namespace]) -> Vec<ValidationFailure> {
        let repository = &environment.repository;
        let mut failures = Vec::new();
        for (_, _, merge) in merges(repository, namespaces) {
            let (Some(source_ref), Some(target_ref)) = (merge.source_property, merge.target_property) else {
                continue;
            };
            let source = repository.property(source_ref);
            let target = repository.property(target_ref);
            if Self::compatible(repository, source, target) {
                continue;
            }
            failures.push(ValidationFailure::error(
                self.name(),
                format!(
                    "The merge paths '{}' and '{}' do not correspond to the same entity type: {} '{}' cannot be merged with {} '{}'.",
                    merge.source_path_string(),
                    merge.target_path_string(),
                    source.kind,
                    source.meta_ed_name,
                    target.kind,
                    target.meta_ed_name
                ),
                Some(&merge.source_map),
            ));
        }
        failures
    }
}
