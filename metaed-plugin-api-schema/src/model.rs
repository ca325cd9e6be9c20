//! API schema data carried on entities and namespaces.

use std::collections::BTreeMap;

use metaed_model::{PluginId, PluginSlot};
use serde::Serialize;

/// An identity value API authorization scopes access by.
///
/// Orders by name, then path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityElement {
    pub meta_ed_name: String,
    pub json_path: String,
}

impl SecurityElement {
    pub fn new(meta_ed_name: impl Into<String>, json_path: impl Into<String>) -> Self {
        Self {
            meta_ed_name: meta_ed_name.into(),
            json_path: json_path.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ApiSchemaEntity {
    pub resource_name: String,
    pub endpoint_name: String,
    /// Sorted JSON paths of the document identity
    pub identity_json_paths: Vec<String>,
    pub student_securable_elements: Vec<String>,
    pub contact_securable_elements: Vec<String>,
    /// Every non-role-named reference to an education organization
    pub education_organization_security_elements: Vec<SecurityElement>,
    /// Identity-only education organization elements
    pub education_organization_securable_elements: Vec<SecurityElement>,
    pub namespace_security_elements: Vec<String>,
    /// Request body schema, `None` for abstract entities
    pub json_schema_for_insert: Option<JsonSchema>,
    /// Top-level property path to where its value lives in a document
    pub document_paths_mapping: BTreeMap<String, DocumentPaths>,
    pub boolean_json_paths: Vec<String>,
    pub numeric_json_paths: Vec<String>,
    pub date_time_json_paths: Vec<String>,
}

impl PluginSlot for ApiSchemaEntity {
    const PLUGIN: PluginId = PluginId::EdfiApiSchema;
}

#[derive(Debug, Default)]
pub struct ApiSchemaNamespace {
    /// Education organization entities declared in the namespace, sorted
    pub education_organization_types: Vec<String>,
    /// Subclass name to the education organizations it references, sorted
    pub education_organization_hierarchy: BTreeMap<String, Vec<String>>,
}

impl PluginSlot for ApiSchemaNamespace {
    const PLUGIN: PluginId = PluginId::EdfiApiSchema;
}

/// A JSON schema node validating part of a request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSchema {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub dialect: Option<&'static str>,
    #[serde(rename = "type")]
    pub schema_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, JsonSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<JsonSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl JsonSchema {
    pub fn scalar(schema_type: &'static str, format: Option<&'static str>) -> Self {
        Self {
            schema_type,
            format,
            ..Self::default()
        }
    }

    /// A closed object. `required` is sorted and deduplicated.
    pub fn object(properties: BTreeMap<String, JsonSchema>, mut required: Vec<String>) -> Self {
        normalize(&mut required);
        Self {
            schema_type: "object",
            properties: Some(properties),
            additional_properties: Some(false),
            required,
            ..Self::default()
        }
    }

    pub fn array(items: JsonSchema, min_items: usize) -> Self {
        Self {
            schema_type: "array",
            items: Some(Box::new(items)),
            min_items: Some(min_items),
            unique_items: Some(false),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Value type found at a JSON path, used to coerce query and body strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathType {
    Boolean,
    Number,
    Date,
    DateTime,
    String,
    Time,
}

/// Where a referenced resource's identity value sits in the referencing document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceJsonPaths {
    pub identity_json_path: String,
    pub reference_json_path: String,
    #[serde(rename = "type")]
    pub path_type: PathType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReferencePaths {
    pub is_reference: bool,
    pub is_descriptor: bool,
    pub project_name: String,
    pub resource_name: String,
    /// Sorted by identity path
    pub reference_json_paths: Vec<ReferenceJsonPaths>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorReferencePath {
    pub is_reference: bool,
    pub is_descriptor: bool,
    pub project_name: String,
    pub resource_name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub path_type: PathType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarPath {
    pub is_reference: bool,
    pub path: String,
    #[serde(rename = "type")]
    pub path_type: PathType,
}

/// The document location of one top-level property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentPaths {
    Reference(DocumentReferencePaths),
    Descriptor(DescriptorReferencePath),
    Scalar(ScalarPath),
}

impl DocumentPaths {
    /// Every concrete path in the document with its value type.
    pub fn typed_paths(&self) -> Vec<(&str, PathType)> {
        match self {
            DocumentPaths::Reference(reference) => reference
                .reference_json_paths
                .iter()
                .map(|paths| (paths.reference_json_path.as_str(), paths.path_type))
                .collect(),
            DocumentPaths::Descriptor(descriptor) => vec![(descriptor.path.as_str(), descriptor.path_type)],
            DocumentPaths::Scalar(scalar) => vec![(scalar.path.as_str(), scalar.path_type)],
        }
    }
}

/// Sort and deduplicate in place.
pub(crate) fn normalize<T: Ord>(values: &mut Vec<T>) {
    values.sort();
    values.dedup();
}
