//! Global registry of every declared property.

use indexmap::IndexMap;

use crate::{PropertyKind, PropertyRef};

/// Maps each property kind to every property of that kind across all
/// namespaces, in declaration order.
#[derive(Debug, Default)]
pub struct PropertyIndex {
    by_kind: IndexMap<PropertyKind, Vec<PropertyRef>>,
    all: Vec<PropertyRef>,
}

impl PropertyIndex {
    pub(crate) fn insert(&mut self, kind: PropertyKind, property: PropertyRef) {
        self.by_kind.entry(kind).or_default().push(property);
        self.all.push(property);
    }

    pub fn of_kind(&self, kind: PropertyKind) -> &[PropertyRef] {
        self.by_kind
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every property, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = PropertyRef> + '_ {
        self.all.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}
