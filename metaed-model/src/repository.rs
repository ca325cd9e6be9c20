//! The in-memory model for one compilation run.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;

use crate::{
    Entity, EntityId, EntityKind, EntityProperty, Namespace, PropertyIndex, PropertyRef,
};

/// Owns every namespace, entity, and property of a model.
///
/// Namespaces keep insertion order so every iteration over the repository
/// is deterministic. Entities live in an arena addressed by [`EntityId`];
/// resolved links between entities are plain handles into that arena.
#[derive(Debug, Default)]
pub struct Repository {
    namespaces: IndexMap<String, Namespace>,
    entities: Vec<Entity>,
    property_index: PropertyIndex,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Namespaces
    // ========================================================================

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.get(name)
    }

    pub fn namespace_mut(&mut self, name: &str) -> Option<&mut Namespace> {
        self.namespaces.get_mut(name)
    }

    /// All namespaces in declaration order.
    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.values()
    }

    pub fn namespace_names(&self) -> Vec<String> {
        self.namespaces.keys().cloned().collect()
    }

    /// Namespaces `name` transitively depends on, nearest first, without duplicates.
    pub fn dependency_chain(&self, name: &str) -> Vec<&str> {
        let mut chain: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([name]);
        let mut queue: VecDeque<&str> = VecDeque::from([name]);

        while let Some(current) = queue.pop_front() {
            let Some(namespace) = self.namespaces.get(current) else {
                continue;
            };
            for dependency in &namespace.dependencies {
                if seen.insert(dependency.as_str()) {
                    chain.push(dependency.as_str());
                    queue.push_back(dependency.as_str());
                }
            }
        }
        chain
    }

    /// Whether entities of `target` are visible from `from`.
    pub fn is_visible(&self, from: &str, target: &str) -> bool {
        from == target || self.dependency_chain(from).contains(&target)
    }

    pub(crate) fn add_namespace(&mut self, namespace: Namespace) {
        self.namespaces.insert(namespace.name.clone(), namespace);
    }

    // ========================================================================
    // Entities
    // ========================================================================

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }

    pub fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.0]
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Every entity in declaration order.
    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + use<> {
        (0..self.entities.len()).map(EntityId)
    }

    /// Find an entity by name in one namespace, trying kinds in order.
    pub fn find_entity(&self, namespace: &str, kinds: &[EntityKind], name: &str) -> Option<EntityId> {
        let namespace = self.namespaces.get(namespace)?;
        kinds.iter().find_map(|kind| namespace.get(*kind, name))
    }

    /// Entities of the given kinds across all namespaces.
    ///
    /// Ordered by namespace, then by the order of `kinds`, then by declaration.
    pub fn entities_of(&self, kinds: &[EntityKind]) -> Vec<EntityId> {
        self.namespaces
            .values()
            .flat_map(|namespace| kinds.iter().flat_map(|kind| namespace.entities_of(*kind)))
            .collect()
    }

    /// Entities of the given kinds in one namespace.
    pub fn entities_in(&self, namespace: &str, kinds: &[EntityKind]) -> Vec<EntityId> {
        self.namespaces
            .get(namespace)
            .map(|namespace| {
                kinds
                    .iter()
                    .flat_map(|kind| namespace.entities_of(*kind))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `Namespace.Name` label for messages.
    pub fn qualified_name(&self, id: EntityId) -> String {
        let entity = self.entity(id);
        format!("{}.{}", entity.namespace, entity.meta_ed_name)
    }

    pub(crate) fn add_entity(&mut self, entity: Entity) {
        for (index, property) in entity.properties.iter().enumerate() {
            self.property_index
                .insert(property.kind, PropertyRef::new(entity.id, index));
        }
        self.entities.push(entity);
    }

    pub(crate) fn next_entity_id(&self) -> EntityId {
        EntityId(self.entities.len())
    }

    // ========================================================================
    // Properties
    // ========================================================================

    pub fn property(&self, property: PropertyRef) -> &EntityProperty {
        &self.entities[property.entity.0].properties[property.index]
    }

    pub fn property_mut(&mut self, property: PropertyRef) -> &mut EntityProperty {
        &mut self.entities[property.entity.0].properties[property.index]
    }

    pub fn property_index(&self) -> &PropertyIndex {
        &self.property_index
    }

    /// Own properties followed by those inherited through the resolved base chain.
    pub fn all_properties(&self, id: EntityId) -> Vec<PropertyRef> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(entity_id) = current {
            if !seen.insert(entity_id) {
                break;
            }
            let entity = self.entity(entity_id);
            result.extend((0..entity.properties.len()).map(|i| PropertyRef::new(entity_id, i)));
            current = entity.base_entity;
        }
        result
    }

    /// Identity properties of an entity, including those inherited from its base.
    ///
    /// A subclass identity rename takes the position of the base identity
    /// property it renames.
    pub fn identity_properties(&self, id: EntityId) -> Vec<PropertyRef> {
        self.identity_properties_guarded(id, &mut HashSet::new())
    }

    fn identity_properties_guarded(&self, id: EntityId, visiting: &mut HashSet<EntityId>) -> Vec<PropertyRef> {
        if !visiting.insert(id) {
            return Vec::new();
        }
        let entity = self.entity(id);
        let own: Vec<PropertyRef> = entity
            .own_identity_properties()
            .map(|(i, _)| PropertyRef::new(id, i))
            .collect();

        let Some(base) = entity.base_entity else {
            return own;
        };
        if entity.kind.is_extension() {
            return self.identity_properties_guarded(base, visiting);
        }

        let mut result = Vec::new();
        for inherited in self.identity_properties_guarded(base, visiting) {
            let inherited_name = &self.property(inherited).meta_ed_name;
            let rename = own.iter().copied().find(|candidate| {
                let candidate = self.property(*candidate);
                candidate.is_identity_rename && candidate.base_key_name.as_ref() == Some(inherited_name)
            });
            result.push(rename.unwrap_or(inherited));
        }
        for property in own {
            if !result.contains(&property) {
                result.push(property);
            }
        }
        result
    }

    /// Whether `id` is `ancestor` or inherits from it through resolved base links.
    pub fn is_same_or_subclass_of(&self, id: EntityId, ancestor: EntityId) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(entity_id) = current {
            if entity_id == ancestor {
                return true;
            }
            if !seen.insert(entity_id) {
                return false;
            }
            current = self.entity(entity_id).base_entity;
        }
        false
    }
}
