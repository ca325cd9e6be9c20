use std::fmt;

use serde::Serialize;

use crate::{Cardinality, EntityId, PluginData, PropertyKind, SourceMap};

/// Handle to a property: the owning entity and the property's position on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PropertyRef {
    pub entity: EntityId,
    pub index: usize,
}

impl PropertyRef {
    pub fn new(entity: EntityId, index: usize) -> Self {
        Self { entity, index }
    }
}

impl fmt::Display for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.index)
    }
}

/// A `merge` directive aligning a property reached through one reference
/// path with an identity property reached through another.
#[derive(Debug, Clone, Default)]
pub struct MergeDirective {
    /// Dot-separated path segments starting with the owning property's full name
    pub source_property_path: Vec<String>,
    pub target_property_path: Vec<String>,
    /// Resolved leaf of the source path
    pub source_property: Option<PropertyRef>,
    /// Resolved leaf of the target path
    pub target_property: Option<PropertyRef>,
    pub source_map: SourceMap,
}

impl MergeDirective {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source_property_path: split_path(source),
            target_property_path: split_path(target),
            ..Self::default()
        }
    }

    pub fn source_path_string(&self) -> String {
        self.source_property_path.join(".")
    }

    pub fn target_path_string(&self) -> String {
        self.target_property_path.join(".")
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// A field declared on an entity.
///
/// Properties are exclusively owned by their parent entity.
#[derive(Debug)]
pub struct EntityProperty {
    pub kind: PropertyKind,
    pub meta_ed_name: String,
    /// Optional rename used to disambiguate references to the same type
    pub role_name: String,
    pub documentation: String,
    pub meta_ed_id: Option<String>,
    pub is_part_of_identity: bool,
    /// Renames an identity property of the base entity on a subclass
    pub is_identity_rename: bool,
    /// The base identity property this one renames
    pub base_key_name: Option<String>,
    pub cardinality: Cardinality,
    pub parent_entity: EntityId,
    /// Explicit namespace qualifier on the referenced name (e.g. `EdFi.School`)
    pub referenced_namespace: Option<String>,
    /// Type a shared simple property declared `named` refers to; the
    /// metaEdName is used when absent
    pub referenced_type: Option<String>,
    /// Resolved target, populated by reference resolution
    pub referenced_entity: Option<EntityId>,
    pub merge_directives: Vec<MergeDirective>,
    pub source_map: SourceMap,
    pub data: PluginData,
}

impl EntityProperty {
    pub(crate) fn new(kind: PropertyKind, meta_ed_name: impl Into<String>, parent: EntityId) -> Self {
        Self {
            kind,
            meta_ed_name: meta_ed_name.into(),
            role_name: String::new(),
            documentation: String::new(),
            meta_ed_id: None,
            is_part_of_identity: false,
            is_identity_rename: false,
            base_key_name: None,
            cardinality: Cardinality::Required,
            parent_entity: parent,
            referenced_namespace: None,
            referenced_type: None,
            referenced_entity: None,
            merge_directives: Vec::new(),
            source_map: SourceMap::default(),
            data: PluginData::new(),
        }
    }

    /// Role name followed by the metaEdName, collapsing a role name equal to the metaEdName.
    pub fn full_property_name(&self) -> String {
        if self.role_name.is_empty() || self.role_name == self.meta_ed_name {
            self.meta_ed_name.clone()
        } else {
            format!("{}{}", self.role_name, self.meta_ed_name)
        }
    }

    /// Name reference resolution looks the target up by.
    pub fn referenced_name(&self) -> &str {
        self.referenced_type.as_deref().unwrap_or(&self.meta_ed_name)
    }

    pub fn has_role_name(&self) -> bool {
        !self.role_name.is_empty()
    }

    pub fn is_identity(&self) -> bool {
        self.is_part_of_identity || self.is_identity_rename
    }

    pub fn is_required(&self) -> bool {
        self.cardinality == Cardinality::Required
    }

    pub fn is_collection(&self) -> bool {
        self.cardinality.is_collection()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(role_name: &str, name: &str) -> EntityProperty {
        let mut p = EntityProperty::new(PropertyKind::DomainEntity, name, EntityId(0));
        p.role_name = role_name.to_string();
        p
    }

    #[test]
    fn test_full_property_name() {
        assert_eq!(property("", "Student").full_property_name(), "Student");
        assert_eq!(property("Parent", "LocalEducationAgency").full_property_name(), "ParentLocalEducationAgency");
        assert_eq!(property("Program", "Program").full_property_name(), "Program");
    }

    #[test]
    fn test_role_name_equal_to_name_still_counts() {
        assert!(property("Program", "Program").has_role_name());
        assert!(!property("", "Program").has_role_name());
    }

    #[test]
    fn test_merge_directive_paths() {
        let merge = MergeDirective::new("Entity1.Prop1", " Prop1 ");
        assert_eq!(merge.source_property_path, vec!["Entity1", "Prop1"]);
        assert_eq!(merge.target_property_path, vec!["Prop1"]);
        assert_eq!(merge.source_path_string(), "Entity1.Prop1");
    }
}
