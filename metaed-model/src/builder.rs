//! Fluent construction of a raw, unresolved [`Repository`].
//!
//! The builder plays the part of the parser front end: it turns a sequence
//! of declarations into namespaces, entities, and properties with string
//! typed references. Nothing is linked here; that is the job of
//! [`crate::resolve_references`].
//!
//! Errors are deferred. Declaration methods keep the builder chainable and
//! the first problem encountered is returned from [`ModelBuilder::build`].

use std::collections::HashSet;

use tracing::debug;

use crate::{
    Cardinality, Entity, EntityKind, EntityProperty, Error, MergeDirective, Namespace,
    NamespaceDecl, PropertyKind, Repository, Result, SourceMap,
};

/// A property declaration for [`ModelBuilder::property`].
#[derive(Debug, Clone)]
pub struct PropertyDecl {
    kind: PropertyKind,
    name: String,
    referenced_namespace: Option<String>,
    referenced_type: Option<String>,
    role_name: String,
    is_part_of_identity: bool,
    base_key_name: Option<String>,
    cardinality: Cardinality,
    merges: Vec<(String, String)>,
    meta_ed_id: Option<String>,
    documentation: String,
}

impl PropertyDecl {
    /// A required property. A qualified name such as `EdFi.School` pins the
    /// reference to that namespace.
    pub fn new(kind: PropertyKind, name: &str) -> Self {
        let (referenced_namespace, name) = split_qualified(name);
        Self {
            kind,
            name,
            referenced_namespace,
            referenced_type: None,
            role_name: String::new(),
            is_part_of_identity: false,
            base_key_name: None,
            cardinality: Cardinality::Required,
            merges: Vec::new(),
            meta_ed_id: None,
            documentation: String::new(),
        }
    }

    pub fn identity(mut self) -> Self {
        self.is_part_of_identity = true;
        self.cardinality = Cardinality::Required;
        self
    }

    /// Give a shared simple property its own name: `shared string URI named Namespace`.
    pub fn named(mut self, name: &str) -> Self {
        self.referenced_type = Some(std::mem::replace(&mut self.name, name.to_string()));
        self
    }

    pub fn role_name(mut self, role_name: impl Into<String>) -> Self {
        self.role_name = role_name.into();
        self
    }

    pub fn optional(mut self) -> Self {
        self.cardinality = Cardinality::Optional;
        self
    }

    pub fn collection(mut self) -> Self {
        self.cardinality = match self.cardinality {
            Cardinality::Optional | Cardinality::OptionalCollection => {
                Cardinality::OptionalCollection
            }
            _ => Cardinality::RequiredCollection,
        };
        self
    }

    /// Add a `merge <source> with <target>` directive.
    pub fn merge(mut self, source: &str, target: &str) -> Self {
        self.merges.push((source.to_string(), target.to_string()));
        self
    }

    /// Mark as a subclass identity rename of the base identity property `base_key`.
    pub fn identity_rename(mut self, base_key: impl Into<String>) -> Self {
        self.base_key_name = Some(base_key.into());
        self.cardinality = Cardinality::Required;
        self
    }

    pub fn meta_ed_id(mut self, meta_ed_id: impl Into<String>) -> Self {
        self.meta_ed_id = Some(meta_ed_id.into());
        self
    }

    pub fn documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }
}

/// Builds a [`Repository`] from declarations.
///
/// ```ignore
/// let repository = ModelBuilder::new()
///     .core_namespace("EdFi")
///     .domain_entity("Student")
///     .identity(PropertyKind::String, "StudentUniqueId")
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct ModelBuilder {
    repository: Repository,
    current_namespace: Option<String>,
    current_entity: Option<Entity>,
    line: usize,
    error: Option<Box<Error>>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Namespaces
    // ========================================================================

    pub fn namespace(mut self, decl: NamespaceDecl) -> Self {
        self.finish_entity();
        self.line += 1;
        if self.repository.namespace(&decl.name).is_some() {
            self.fail(Error::DuplicateNamespace {
                namespace: decl.name.clone(),
            });
        }
        debug!(namespace = %decl.name, extension = decl.is_extension, "declare namespace");
        self.current_namespace = Some(decl.name.clone());
        self.repository.add_namespace(Namespace::new(decl));
        self
    }

    pub fn core_namespace(self, name: &str) -> Self {
        self.namespace(NamespaceDecl::core(name))
    }

    pub fn extension_namespace(self, name: &str, project_extension: &str) -> Self {
        self.namespace(NamespaceDecl::extension(name, project_extension))
    }

    // ========================================================================
    // Entities
    // ========================================================================

    /// Declare an entity of any kind. Later property declarations attach to it.
    pub fn entity(mut self, kind: EntityKind, name: &str) -> Self {
        self.open_entity(kind, name, None);
        self
    }

    pub fn domain_entity(self, name: &str) -> Self {
        self.entity(EntityKind::DomainEntity, name)
    }

    pub fn abstract_entity(self, name: &str) -> Self {
        self.entity(EntityKind::AbstractEntity, name)
    }

    pub fn association(self, name: &str) -> Self {
        self.entity(EntityKind::Association, name)
    }

    pub fn descriptor(self, name: &str) -> Self {
        self.entity(EntityKind::Descriptor, name)
    }

    pub fn common(self, name: &str) -> Self {
        self.entity(EntityKind::Common, name)
    }

    pub fn choice(self, name: &str) -> Self {
        self.entity(EntityKind::Choice, name)
    }

    pub fn enumeration(self, name: &str) -> Self {
        self.entity(EntityKind::Enumeration, name)
    }

    pub fn shared_string(self, name: &str) -> Self {
        self.entity(EntityKind::SharedString, name)
    }

    pub fn domain_entity_subclass(mut self, name: &str, base: &str) -> Self {
        self.open_entity(EntityKind::DomainEntitySubclass, name, Some(base));
        self
    }

    pub fn association_subclass(mut self, name: &str, base: &str) -> Self {
        self.open_entity(EntityKind::AssociationSubclass, name, Some(base));
        self
    }

    /// An extension is named after the entity it extends.
    pub fn domain_entity_extension(mut self, base: &str) -> Self {
        let (_, name) = split_qualified(base);
        self.open_entity(EntityKind::DomainEntityExtension, &name, Some(base));
        self
    }

    pub fn association_extension(mut self, base: &str) -> Self {
        let (_, name) = split_qualified(base);
        self.open_entity(EntityKind::AssociationExtension, &name, Some(base));
        self
    }

    pub fn documentation(mut self, documentation: &str) -> Self {
        if let Some(entity) = self.current_entity.as_mut() {
            entity.documentation = documentation.to_string();
        }
        self
    }

    pub fn meta_ed_id(mut self, meta_ed_id: &str) -> Self {
        if let Some(entity) = self.current_entity.as_mut() {
            entity.meta_ed_id = Some(meta_ed_id.to_string());
        }
        self
    }

    // ========================================================================
    // Properties
    // ========================================================================

    pub fn property(mut self, decl: PropertyDecl) -> Self {
        self.line += 1;
        let line = self.line;
        let Some(entity) = self.current_entity.as_mut() else {
            self.fail(Error::NoOpenEntity { name: decl.name });
            return self;
        };

        let file = source_file(&entity.namespace);
        let mut property = EntityProperty::new(decl.kind, &decl.name, entity.id);
        property.source_map = SourceMap::new(&file, line, 4, &decl.name);
        property.role_name = decl.role_name;
        property.is_part_of_identity = decl.is_part_of_identity && decl.base_key_name.is_none();
        property.is_identity_rename = decl.base_key_name.is_some();
        property.base_key_name = decl.base_key_name;
        property.cardinality = decl.cardinality;
        property.referenced_namespace = decl.referenced_namespace;
        property.referenced_type = decl.referenced_type;
        property.meta_ed_id = decl.meta_ed_id;
        property.documentation = decl.documentation;

        for (source, target) in decl.merges {
            self.line += 1;
            let mut merge = MergeDirective::new(&source, &target);
            merge.source_map = SourceMap::new(&file, self.line, 6, "merge");
            property.merge_directives.push(merge);
        }
        entity.properties.push(property);
        self
    }

    pub fn identity(self, kind: PropertyKind, name: &str) -> Self {
        self.property(PropertyDecl::new(kind, name).identity())
    }

    pub fn required(self, kind: PropertyKind, name: &str) -> Self {
        self.property(PropertyDecl::new(kind, name))
    }

    pub fn optional(self, kind: PropertyKind, name: &str) -> Self {
        self.property(PropertyDecl::new(kind, name).optional())
    }

    pub fn collection(self, kind: PropertyKind, name: &str) -> Self {
        self.property(PropertyDecl::new(kind, name).collection())
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Finish construction and check namespace dependency edges.
    pub fn build(mut self) -> Result<Repository> {
        self.finish_entity();
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut repository = self.repository;
        let first_core = repository
            .namespaces()
            .find(|namespace| !namespace.is_extension)
            .map(|namespace| namespace.name.clone());

        for name in repository.namespace_names() {
            let Some(namespace) = repository.namespace_mut(&name) else {
                continue;
            };
            if namespace.is_extension && namespace.dependencies.is_empty() {
                match &first_core {
                    Some(core) => namespace.dependencies.push(core.clone()),
                    None => return Err(Box::new(Error::ExtensionWithoutCore { namespace: name })),
                }
            }
        }

        for namespace in repository.namespaces() {
            for dependency in &namespace.dependencies {
                if repository.namespace(dependency).is_none() {
                    return Err(Box::new(Error::UnknownDependency {
                        namespace: namespace.name.clone(),
                        dependency: dependency.clone(),
                    }));
                }
            }
        }

        for name in repository.namespace_names() {
            if let Some(cycle) = find_cycle(&repository, &name, &mut Vec::new(), &mut HashSet::new()) {
                return Err(Box::new(Error::DependencyCycle { cycle }));
            }
        }

        debug!(
            namespaces = repository.namespace_names().len(),
            entities = repository.entity_count(),
            properties = repository.property_index().len(),
            "model built"
        );
        Ok(repository)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn open_entity(&mut self, kind: EntityKind, name: &str, base: Option<&str>) {
        self.finish_entity();
        self.line += 1;

        let Some(namespace_name) = self.current_namespace.clone() else {
            self.fail(Error::NoOpenNamespace {
                name: name.to_string(),
            });
            return;
        };

        let id = self.repository.next_entity_id();
        let inserted = match self.repository.namespace_mut(&namespace_name) {
            Some(namespace) => namespace.insert(kind, name, id),
            None => Ok(()),
        };
        if inserted.is_err() {
            self.fail(Error::DuplicateEntity {
                namespace: namespace_name,
                kind,
                name: name.to_string(),
            });
            return;
        }

        let mut entity = Entity::new(id, kind, name, &namespace_name);
        entity.source_map = SourceMap::new(source_file(&namespace_name), self.line, 2, name);
        if let Some(base) = base {
            let (base_namespace, base_name) = split_qualified(base);
            entity.base_entity_namespace = base_namespace;
            entity.base_entity_name = Some(base_name);
        }
        self.current_entity = Some(entity);
    }

    fn finish_entity(&mut self) {
        if let Some(entity) = self.current_entity.take() {
            self.repository.add_entity(entity);
        }
    }

    fn fail(&mut self, error: Error) {
        if self.error.is_none() {
            self.error = Some(Box::new(error));
        }
    }
}

fn source_file(namespace: &str) -> String {
    format!("{namespace}.metaed")
}

fn split_qualified(name: &str) -> (Option<String>, String) {
    match name.split_once('.') {
        Some((namespace, name)) => (Some(namespace.to_string()), name.to_string()),
        None => (None, name.to_string()),
    }
}

fn find_cycle(
    repository: &Repository,
    name: &str,
    stack: &mut Vec<String>,
    done: &mut HashSet<String>,
) -> Option<Vec<String>> {
    if let Some(start) = stack.iter().position(|n| n == name) {
        let mut cycle = stack[start..].to_vec();
        cycle.push(name.to_string());
        return Some(cycle);
    }
    if done.contains(name) {
        return None;
    }

    stack.push(name.to_string());
    if let Some(namespace) = repository.namespace(name) {
        for dependency in &namespace.dependencies {
            if let Some(cycle) = find_cycle(repository, dependency, stack, done) {
                return Some(cycle);
            }
        }
    }
    stack.pop();
    done.insert(name.to_string());
    None
}
