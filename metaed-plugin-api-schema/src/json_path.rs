//! JSON locations of model properties in API documents.
//!
//! A scalar identity property sits at `$.{name}`. A reference is an object
//! named `{name}Reference` holding the flattened identity of its target,
//! so `StudentSchoolAssociation`'s student identity is found at
//! `$.studentReference.studentUniqueId`.

use metaed_core::{decapitalize, pluralize};
use metaed_model::{EntityId, EntityProperty, FlattenedIdentityProperty, PropertyKind, PropertyRef, Repository};

use crate::model::PathType;

/// JSON name of a scalar or descriptor property.
pub fn property_json_name(property: &EntityProperty) -> String {
    let name = decapitalize(&property.full_property_name());
    match property.kind {
        PropertyKind::Descriptor => format!("{name}Descriptor"),
        _ => name,
    }
}

/// JSON name of the object a reference property becomes.
pub fn reference_json_name(property: &EntityProperty) -> String {
    format!("{}Reference", decapitalize(&property.full_property_name()))
}

/// JSON name of the array a collection property becomes.
pub fn collection_json_name(property: &EntityProperty) -> String {
    pluralize(&decapitalize(&property.full_property_name()))
}

/// Type of the value a simple property holds in a document.
pub fn path_type(kind: PropertyKind) -> PathType {
    match kind {
        PropertyKind::Boolean => PathType::Boolean,
        PropertyKind::Currency
        | PropertyKind::Decimal
        | PropertyKind::Duration
        | PropertyKind::Percent
        | PropertyKind::SharedDecimal
        | PropertyKind::Integer
        | PropertyKind::SharedInteger
        | PropertyKind::Short
        | PropertyKind::SharedShort
        | PropertyKind::SchoolYearEnumeration
        | PropertyKind::Year => PathType::Number,
        PropertyKind::Date => PathType::Date,
        PropertyKind::Datetime => PathType::DateTime,
        PropertyKind::Time => PathType::Time,
        _ => PathType::String,
    }
}

/// Properties that appear in an entity's documents: own and inherited,
/// except base identity properties a subclass renames.
pub fn document_properties(repository: &Repository, entity: EntityId) -> Vec<PropertyRef> {
    let renamed: Vec<&str> = repository
        .entity(entity)
        .properties
        .iter()
        .filter_map(|p| p.base_key_name.as_deref())
        .collect();
    repository
        .all_properties(entity)
        .into_iter()
        .filter(|p| p.entity == entity || !renamed.contains(&repository.property(*p).full_property_name().as_str()))
        .collect()
}

/// JSON path of one flattened identity element.
pub fn identity_json_path(repository: &Repository, element: &FlattenedIdentityProperty) -> String {
    let top = repository.property(element.top_level_property());
    let rest = &element.chain[1..];
    match top.kind {
        kind if kind.is_referential() => {
            format!("$.{}.{}", reference_json_name(top), nested_json_name(repository, rest))
        }
        PropertyKind::Common => format!(
            "$.{}.{}",
            decapitalize(&top.full_property_name()),
            nested_json_name(repository, rest)
        ),
        PropertyKind::InlineCommon | PropertyKind::Choice => {
            format!("$.{}", nested_json_name(repository, rest))
        }
        _ => format!("$.{}", property_json_name(top)),
    }
}

/// Name of the leaf of `chain` inside a reference object. Role names of the
/// references walked on the way down prefix the leaf name.
pub fn nested_json_name(repository: &Repository, chain: &[PropertyRef]) -> String {
    let Some((leaf, walked)) = chain.split_last() else {
        return String::new();
    };
    let prefix: String = walked
        .iter()
        .map(|p| repository.property(*p))
        .filter(|p| p.kind.is_referential())
        .map(|p| p.role_name.as_str())
        .collect();
    let leaf = repository.property(*leaf);
    let name = decapitalize(&format!("{prefix}{}", leaf.full_property_name()));
    match leaf.kind {
        PropertyKind::Descriptor => format!("{name}Descriptor"),
        _ => name,
    }
}
