//! Links `merge` directives to the properties their paths name.

use metaed_model::PropertyRef;
use metaed_pipeline::{Enhancer, EnhancerResult, MetaEdEnvironment};
use tracing::debug;

use crate::path::{
    find_referenced_property, match_all_but_first_as_identity_properties,
    match_all_identity_reference_properties,
};

/// Resolves the source and target path of every merge directive.
///
/// Both paths are resolved from the entity that owns the merging property.
/// A path that cannot be resolved leaves its link empty; the merge
/// validators report it.
pub struct MergeDirectiveEnhancer;

impl Enhancer for MergeDirectiveEnhancer {
    fn name(&self) -> &'static str {
        "MergeDirectiveEnhancer"
    }

    fn enhance(&self, environment: &mut MetaEdEnvironment) -> EnhancerResult {
        let repository = &mut environment.repository;

        let merging: Vec<PropertyRef> = repository
            .property_index()
            .iter()
            .filter(|p| !repository.property(*p).merge_directives.is_empty())
            .collect();

        let mut resolved = 0usize;
        for property_ref in merging {
            let links: Vec<(Option<PropertyRef>, Option<PropertyRef>)> = repository
                .property(property_ref)
                .merge_directives
                .iter()
                .map(|merge| {
                    let source = find_referenced_property(
                        repository,
                        property_ref.entity,
                        &merge.source_property_path,
                        match_all_but_first_as_identity_properties,
                    );
                    let target = find_referenced_property(
                        repository,
                        property_ref.entity,
                        &merge.target_property_path,
                        match_all_identity_reference_properties,
                    );
                    (source, target)
                })
                .collect();

            let property = repository.property_mut(property_ref);
            for (merge, (source, target)) in property.merge_directives.iter_mut().zip(links) {
                if source.is_some() && target.is_some() {
                    resolved += 1;
                }
                merge.source_property = source;
                merge.target_property = target;
            }
        }

        debug!(resolved, "merge directives linked");
        EnhancerResult::ok(self.name())
    }
}
