//! The unified plugin: structural enhancement and cross-cutting rules that
//! every other MetaEd plugin builds on.
//!
//! - [`path`] - property path lookup across reference chains
//! - [`enhancer`] - merge directive linking
//! - [`validator`] - merge, identity rename, identity, and MetaEdId rules

pub mod enhancer;
pub mod path;
pub mod validator;

use metaed_model::PluginId;
use metaed_pipeline::{MetaEdPlugin, PluginComponents};

pub use path::{
    PathResolution, find_referenced_property, match_all_but_first_as_identity_properties,
    match_all_identity_reference_properties, resolve_property_path,
};

/// Must be registered before every plugin that reads merge links.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnifiedPlugin;

impl MetaEdPlugin for UnifiedPlugin {
    fn id(&self) -> PluginId {
        PluginId::Unified
    }

    fn initialize(&self) -> PluginComponents {
        PluginComponents::new()
            .enhancer(enhancer::MergeDirectiveEnhancer)
            .validator(validator::MergeDirectiveMustStartSourcePathWithPropertyName)
            .validator(validator::SourcePropertyPathMustExist)
            .validator(validator::TargetPropertyPathMustExist)
            .validator(validator::SourcePropertyAndTargetPropertyMustMatch)
            .validator(validator::IdentityRenameExistsOnlyIfIdentityOnBase)
            .validator(validator::IdentityRenameMustMatchIdentityPropertyInBase)
            .validator(validator::IdentityRenameMustExistNoMoreThanOnce)
            .validator(validator::MustNotDuplicateMetaEdId)
            .validator(validator::AbstractEntityMustContainAnIdentity)
            .validator(validator::DomainEntityMustContainAnIdentity)
    }
}
