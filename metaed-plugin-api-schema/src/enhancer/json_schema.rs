//! Request body schemas for inserting each resource.
//!
//! A reference becomes a closed object holding the flattened identity of its
//! target. Inline commons and choices contribute their properties to the
//! enclosing object; choice members are never required.

use std::collections::BTreeMap;

use metaed_core::decapitalize;
use metaed_model::{EntityId, EntityKind, PropertyKind, Repository, flattened_identity};
use metaed_pipeline::{Enhancer, EnhancerResult, MetaEdEnvironment};
use tracing::debug;

use super::identity_json_paths::resource_entities;
use crate::{
    json_path::{collection_json_name, document_properties, nested_json_name, property_json_name, reference_json_name},
    model::{ApiSchemaEntity, JsonSchema},
};

pub const JSON_SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// All descriptors share one body shape.
pub fn descriptor_schema() -> JsonSchema {
    let string = |description: &str| JsonSchema::scalar("string", None).with_description(description);
    let properties = BTreeMap::from([
        ("namespace".to_string(), string("The descriptor namespace as a URI")),
        ("codeValue".to_string(), string("The descriptor code value")),
        ("shortDescription".to_string(), string("The descriptor short description")),
        ("description".to_string(), string("The descriptor description")),
    ]);
    let required = ["namespace", "codeValue", "shortDescription"].map(String::from).to_vec();
    JsonSchema {
        dialect: Some(JSON_SCHEMA_DIALECT),
        title: Some("EdFi.Descriptor".to_string()),
        ..JsonSchema::object(properties, required)
    }
    .with_description("An Ed-Fi Descriptor")
}

fn simple_schema(kind: PropertyKind) -> JsonSchema {
    match kind {
        PropertyKind::Boolean => JsonSchema::scalar("boolean", None),
        PropertyKind::Currency
        | PropertyKind::Decimal
        | PropertyKind::Duration
        | PropertyKind::Percent
        | PropertyKind::SharedDecimal => JsonSchema::scalar("number", None),
        PropertyKind::Integer
        | PropertyKind::SharedInteger
        | PropertyKind::Short
        | PropertyKind::SharedShort
        | PropertyKind::SchoolYearEnumeration
        | PropertyKind::Year => JsonSchema::scalar("integer", None),
        PropertyKind::Date => JsonSchema::scalar("string", Some("date")),
        PropertyKind::Datetime => JsonSchema::scalar("string", Some("date-time")),
        PropertyKind::Time => JsonSchema::scalar("string", Some("time")),
        _ => JsonSchema::scalar("string", None),
    }
}

/// Object of the target's identity values, all required.
fn reference_schema(repository: &Repository, target: Option<EntityId>) -> JsonSchema {
    let mut properties = BTreeMap::new();
    for element in target.map(|id| flattened_identity(repository, id)).unwrap_or_default() {
        let leaf = repository.property(element.identity_property);
        let schema = simple_schema(leaf.kind).with_description(leaf.documentation.clone());
        properties.insert(nested_json_name(repository, &element.chain), schema);
    }
    let required = properties.keys().cloned().collect();
    JsonSchema::object(properties, required)
}

#[derive(Default)]
struct ObjectBuilder {
    properties: BTreeMap<String, JsonSchema>,
    required: Vec<String>,
}

impl ObjectBuilder {
    fn insert(&mut self, name: String, schema: JsonSchema, required: bool) {
        if required {
            self.required.push(name.clone());
        }
        self.properties.insert(name, schema);
    }

    fn finish(self) -> JsonSchema {
        JsonSchema::object(self.properties, self.required)
    }
}

fn collect_properties(repository: &Repository, entity: EntityId, object: &mut ObjectBuilder, optional_due_to_parent: bool) {
    for property_ref in document_properties(repository, entity) {
        let property = repository.property(property_ref);
        let required = (property.cardinality.is_required() || property.is_identity()) && !optional_due_to_parent;

        match property.kind {
            PropertyKind::InlineCommon | PropertyKind::Choice => {
                if let Some(target) = property.referenced_entity {
                    let optional = optional_due_to_parent || property.kind == PropertyKind::Choice || !required;
                    collect_properties(repository, target, object, optional);
                }
                continue;
            }
            _ => {}
        }

        let (item_name, item) = match property.kind {
            kind if kind.is_referential() => (
                reference_json_name(property),
                reference_schema(repository, property.referenced_entity),
            ),
            PropertyKind::Descriptor => (
                property_json_name(property),
                JsonSchema::scalar("string", None).with_description("An Ed-Fi Descriptor"),
            ),
            PropertyKind::Common => {
                let mut common = ObjectBuilder::default();
                if let Some(target) = property.referenced_entity {
                    collect_properties(repository, target, &mut common, false);
                }
                (decapitalize(&property.full_property_name()), common.finish())
            }
            kind => (
                property_json_name(property),
                simple_schema(kind).with_description(property.documentation.clone()),
            ),
        };

        if !property.is_collection() {
            object.insert(item_name, item, required);
            continue;
        }
        let element = match property.kind {
            PropertyKind::Common => item,
            _ => JsonSchema::object(BTreeMap::from([(item_name.clone(), item)]), vec![item_name]),
        };
        let min_items = usize::from(required);
        object.insert(collection_json_name(property), JsonSchema::array(element, min_items), required);
    }
}

/// Insert schema of a domain entity, association, or subclass.
pub fn resource_json_schema(repository: &Repository, entity: EntityId) -> JsonSchema {
    let mut object = ObjectBuilder::default();
    collect_properties(repository, entity, &mut object, false);
    let ext = JsonSchema {
        properties: Some(BTreeMap::new()),
        additional_properties: Some(true),
        ..JsonSchema::scalar("object", None)
    }
    .with_description("optional extension collection");
    object.properties.insert("_ext".to_string(), ext);

    let entity = repository.entity(entity);
    let project_name = repository
        .namespace(&entity.namespace)
        .map_or(entity.namespace.as_str(), |namespace| namespace.project_name.as_str());
    JsonSchema {
        dialect: Some(JSON_SCHEMA_DIALECT),
        title: Some(format!("{project_name}.{}", entity.meta_ed_name)),
        ..object.finish()
    }
    .with_description(entity.documentation.clone())
}

/// Builds `jsonSchemaForInsert` for every concrete resource.
pub struct JsonSchemaEnhancer;

impl Enhancer for JsonSchemaEnhancer {
    fn name(&self) -> &'static str {
        "JsonSchemaEnhancer"
    }

    fn enhance(&self, environment: &mut MetaEdEnvironment) -> EnhancerResult {
        let repository = &environment.repository;
        let derived: Vec<_> = resource_entities(repository)
            .into_iter()
            .filter_map(|id| match repository.entity(id).kind {
                EntityKind::AbstractEntity => None,
                EntityKind::Descriptor => Some((id, descriptor_schema())),
                _ => Some((id, resource_json_schema(repository, id))),
            })
            .collect();

        debug!(schemas = derived.len(), "json schemas built");
        for (id, schema) in derived {
            environment
                .repository
                .entity_mut(id)
                .data
                .get_or_default::<ApiSchemaEntity>()
                .json_schema_for_insert = Some(schema);
        }
        EnhancerResult::ok(self.name())
    }
}
