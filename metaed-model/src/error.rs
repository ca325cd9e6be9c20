use miette::Diagnostic;
use thiserror::Error;

use crate::EntityKind;

/// Result type for model construction (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("duplicate {kind} '{name}' in namespace '{namespace}'")]
    #[diagnostic(
        code(metaed::duplicate_entity),
        help("entity names must be unique per kind within a namespace; rename one of them")
    )]
    DuplicateEntity {
        namespace: String,
        kind: EntityKind,
        name: String,
    },

    #[error("'{name}' is declared before any namespace")]
    #[diagnostic(
        code(metaed::no_open_namespace),
        help("declare a namespace with `core_namespace` or `extension_namespace` first")
    )]
    NoOpenNamespace { name: String },

    #[error("property '{name}' is declared outside of an entity")]
    #[diagnostic(code(metaed::no_open_entity), help("declare an entity before its properties"))]
    NoOpenEntity { name: String },

    #[error("namespace '{namespace}' depends on unknown namespace '{dependency}'")]
    #[diagnostic(code(metaed::unknown_dependency))]
    UnknownDependency { namespace: String, dependency: String },

    #[error("extension namespace '{namespace}' has no core namespace to depend on")]
    #[diagnostic(
        code(metaed::extension_without_core),
        help("declare the core data standard namespace before its extensions")
    )]
    ExtensionWithoutCore { namespace: String },

    #[error("namespace dependency cycle: {}", cycle.join(" -> "))]
    #[diagnostic(code(metaed::dependency_cycle))]
    DependencyCycle { cycle: Vec<String> },

    #[error("duplicate namespace '{namespace}'")]
    #[diagnostic(code(metaed::duplicate_namespace))]
    DuplicateNamespace { namespace: String },
}
