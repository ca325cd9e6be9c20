//! MetaEd model: namespaces, entities, properties, and the links between them.
//!
//! A [`Repository`] is built fresh for every compilation, either by a parser
//! front end or by [`ModelBuilder`]. [`resolve_references`] then links every
//! named reference under the namespace visibility rules, after which plugins
//! derive their data into the [`PluginData`] bags carried by each element.

mod builder;
mod entity;
mod error;
mod identity;
mod kind;
mod namespace;
mod plugin_data;
mod property;
mod property_index;
mod repository;
mod resolve;
mod source_map;

pub use builder::{ModelBuilder, PropertyDecl};
pub use entity::{Entity, EntityId};
pub use error::{Error, Result};
pub use identity::{FlattenedIdentityProperty, flattened_identity};
pub use kind::{Cardinality, EntityKind, PropertyKind};
pub use namespace::{Namespace, NamespaceDecl};
pub use plugin_data::{PluginData, PluginId, PluginSlot};
pub use property::{EntityProperty, MergeDirective, PropertyRef};
pub use property_index::PropertyIndex;
pub use repository::Repository;
pub use resolve::{UnresolvedReference, lookup, resolve_references};
pub use source_map::SourceMap;
