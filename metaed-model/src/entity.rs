use std::fmt;

use serde::Serialize;

use crate::{EntityKind, EntityProperty, PluginData, SourceMap};

/// Handle to an entity in the repository arena.
///
/// Handles do not own anything; the namespace entity maps remain the
/// owners of their entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(pub(crate) usize);

impl EntityId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A top level model construct (domain entity, association, descriptor, ...).
#[derive(Debug)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub meta_ed_name: String,
    /// Name of the owning namespace
    pub namespace: String,
    pub documentation: String,
    /// Stable cross-version identifier, if declared
    pub meta_ed_id: Option<String>,
    /// Abstract entities are not resources themselves
    pub is_abstract: bool,
    /// Declared base name for subclass and extension kinds
    pub base_entity_name: Option<String>,
    /// Explicit namespace qualifier on the base name, if any
    pub base_entity_namespace: Option<String>,
    /// Resolved base, populated by reference resolution
    pub base_entity: Option<EntityId>,
    pub properties: Vec<EntityProperty>,
    pub source_map: SourceMap,
    pub data: PluginData,
}

impl Entity {
    pub(crate) fn new(
        id: EntityId,
        kind: EntityKind,
        meta_ed_name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            meta_ed_name: meta_ed_name.into(),
            namespace: namespace.into(),
            documentation: String::new(),
            meta_ed_id: None,
            is_abstract: kind == EntityKind::AbstractEntity,
            base_entity_name: None,
            base_entity_namespace: None,
            base_entity: None,
            properties: Vec::new(),
            source_map: SourceMap::default(),
            data: PluginData::new(),
        }
    }

    /// Whether this entity declares a base (subclasses and extensions).
    pub fn has_base(&self) -> bool {
        !self.kind.base_kinds().is_empty()
    }

    /// Index of the first property with the given full property name.
    pub fn property_index(&self, full_property_name: &str) -> Option<usize> {
        self.properties
            .iter()
            .position(|p| p.full_property_name() == full_property_name)
    }

    /// Identity properties declared directly on this entity.
    pub fn own_identity_properties(&self) -> impl Iterator<Item = (usize, &EntityProperty)> {
        self.properties
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_part_of_identity || p.is_identity_rename)
    }
}
