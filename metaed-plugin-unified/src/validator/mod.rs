//! Cross-cutting rule checks of the unified plugin.

mod identity;
mod identity_rename;
mod merge_directive;
mod meta_ed_id;

pub use identity::{AbstractEntityMustContainAnIdentity, DomainEntityMustContainAnIdentity};
pub use identity_rename::{
    IdentityRenameExistsOnlyIfIdentityOnBase, IdentityRenameMustExistNoMoreThanOnce,
    IdentityRenameMustMatchIdentityPropertyInBase,
};
pub use merge_directive::{
    MergeDirectiveMustStartSourcePathWithPropertyName, SourcePropertyAndTargetPropertyMustMatch,
    SourcePropertyPathMustExist, TargetPropertyPathMustExist,
};
pub use meta_ed_id::MustNotDuplicateMetaEdId;

use metaed_model::{EntityId, EntityKind, Namespace, Repository};

/// Entities owned by the given namespaces, namespace by namespace.
pub(crate) fn entities_in_namespaces(repository: &Repository, namespaces: &[&Namespace]) -> Vec<EntityId> {
    namespaces
        .iter()
        .flat_map(|namespace| repository.entities_in(&namespace.name, &EntityKind::ALL))
        .collect()
}
