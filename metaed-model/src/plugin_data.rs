//! Per-plugin derived data attached to namespaces, entities, and properties.
//!
//! Every model element owns one [`PluginData`] bag. A bag holds at most one
//! slot per [`PluginId`], and each slot is the strongly typed struct the
//! owning plugin declared for that kind of element. Enhancers write only
//! their own plugin's slot and read slots of plugins that ran before them.

use std::{any::Any, fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifies a plugin and, with it, the data slot the plugin owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PluginId {
    Unified,
    EdfiOdsRelational,
    EdfiOdsPostgresql,
    EdfiOdsSqlServer,
    EdfiApiSchema,
}

impl PluginId {
    pub const ALL: [PluginId; 5] = [
        PluginId::Unified,
        PluginId::EdfiOdsRelational,
        PluginId::EdfiOdsPostgresql,
        PluginId::EdfiOdsSqlServer,
        PluginId::EdfiApiSchema,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginId::Unified => "unified",
            PluginId::EdfiOdsRelational => "edfiOdsRelational",
            PluginId::EdfiOdsPostgresql => "edfiOdsPostgresql",
            PluginId::EdfiOdsSqlServer => "edfiOdsSqlServer",
            PluginId::EdfiApiSchema => "edfiApiSchema",
        }
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PluginId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown plugin '{s}'"))
    }
}

/// A plugin's derived data for one kind of model element.
pub trait PluginSlot: Any + Default + fmt::Debug + Send + Sync {
    /// The plugin that owns this slot.
    const PLUGIN: PluginId;
}

/// Typed map from plugin to that plugin's derived data.
#[derive(Default)]
pub struct PluginData {
    slots: IndexMap<PluginId, Box<dyn Any + Send + Sync>>,
}

impl PluginData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a plugin's slot, if that plugin has written one.
    pub fn get<T: PluginSlot>(&self) -> Option<&T> {
        self.slots
            .get(&T::PLUGIN)
            .and_then(|slot| slot.downcast_ref::<T>())
    }

    /// Get a plugin's slot for writing, creating an empty one on first use.
    ///
    /// A slot of another type stored under the same plugin is a bug in that
    /// plugin: debug builds panic, release builds start a fresh slot.
    pub fn get_or_default<T: PluginSlot>(&mut self) -> &mut T {
        let slot = self
            .slots
            .entry(T::PLUGIN)
            .or_insert_with(|| Box::new(T::default()));
        debug_assert!(
            (**slot).is::<T>(),
            "{} slot holds a different type than {}",
            T::PLUGIN,
            std::any::type_name::<T>()
        );
        if !(**slot).is::<T>() {
            *slot = Box::new(T::default());
        }
        (**slot)
            .downcast_mut::<T>()
            .expect("slot was just checked to hold this type")
    }

    /// Replace a plugin's slot.
    pub fn set<T: PluginSlot>(&mut self, value: T) {
        self.slots.insert(T::PLUGIN, Box::new(value));
    }

    pub fn contains(&self, plugin: PluginId) -> bool {
        self.slots.contains_key(&plugin)
    }

    /// Plugins that have written to this bag, in first-write order.
    pub fn plugins(&self) -> impl Iterator<Item = PluginId> + '_ {
        self.slots.keys().copied()
    }
}

impl fmt::Debug for PluginData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.slots.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Counter {
        count: usize,
    }

    impl PluginSlot for Counter {
        const PLUGIN: PluginId = PluginId::Unified;
    }

    #[derive(Debug, Default)]
    struct Paths(Vec<String>);

    impl PluginSlot for Paths {
        const PLUGIN: PluginId = PluginId::EdfiApiSchema;
    }

    #[test]
    fn test_empty_bag() {
        let data = PluginData::new();
        assert!(data.get::<Counter>().is_none());
        assert!(!data.contains(PluginId::Unified));
    }

    #[test]
    fn test_get_or_default_creates_slot() {
        let mut data = PluginData::new();
        data.get_or_default::<Counter>().count += 2;
        data.get_or_default::<Counter>().count += 1;
        assert_eq!(data.get::<Counter>(), Some(&Counter { count: 3 }));
    }

    #[test]
    fn test_slots_are_independent() {
        let mut data = PluginData::new();
        data.get_or_default::<Paths>().0.push("$.schoolId".into());
        data.set(Counter { count: 7 });

        assert_eq!(data.get::<Paths>().unwrap().0, vec!["$.schoolId".to_string()]);
        assert_eq!(data.get::<Counter>().unwrap().count, 7);
        assert_eq!(
            data.plugins().collect::<Vec<_>>(),
            vec![PluginId::EdfiApiSchema, PluginId::Unified]
        );
    }

    #[derive(Debug, Default)]
    struct OtherUnified;

    impl PluginSlot for OtherUnified {
        const PLUGIN: PluginId = PluginId::Unified;
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unified slot holds a different type")]
    fn test_mismatched_slot_type_is_caught() {
        let mut data = PluginData::new();
        data.set(Counter { count: 1 });
        data.get_or_default::<OtherUnified>();
    }

    #[test]
    fn test_plugin_id_round_trip_names() {
        for id in PluginId::ALL {
            assert_eq!(id.as_str().parse::<PluginId>().unwrap(), id);
        }
        assert!("edfiXsd".parse::<PluginId>().is_err());
    }
}
