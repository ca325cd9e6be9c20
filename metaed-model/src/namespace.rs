use indexmap::IndexMap;

use crate::{EntityId, EntityKind, PluginData};

/// A named partition of the model: the core data standard or one extension project.
#[derive(Debug)]
pub struct Namespace {
    pub name: String,
    pub project_name: String,
    pub project_version: String,
    /// Short project prefix used by extensions (empty for core)
    pub project_extension: String,
    pub is_extension: bool,
    /// Namespaces this one may reference, in declaration order
    pub dependencies: Vec<String>,
    entities: IndexMap<EntityKind, IndexMap<String, EntityId>>,
    pub data: PluginData,
}

impl Namespace {
    pub(crate) fn new(decl: NamespaceDecl) -> Self {
        Self {
            project_name: decl.project_name.unwrap_or_else(|| decl.name.clone()),
            name: decl.name,
            project_version: decl.project_version,
            project_extension: decl.project_extension,
            is_extension: decl.is_extension,
            dependencies: decl.dependencies,
            entities: IndexMap::new(),
            data: PluginData::new(),
        }
    }

    /// Look up an entity of one kind by name.
    pub fn get(&self, kind: EntityKind, name: &str) -> Option<EntityId> {
        self.entities.get(&kind).and_then(|map| map.get(name)).copied()
    }

    /// Entities of one kind in declaration order.
    pub fn entities_of(&self, kind: EntityKind) -> impl Iterator<Item = EntityId> + '_ {
        self.entities
            .get(&kind)
            .into_iter()
            .flat_map(|map| map.values().copied())
    }

    pub fn entity_count(&self, kind: EntityKind) -> usize {
        self.entities.get(&kind).map_or(0, IndexMap::len)
    }

    /// Register an entity, returning the existing id on a (kind, name) collision.
    pub(crate) fn insert(&mut self, kind: EntityKind, name: &str, id: EntityId) -> Result<(), EntityId> {
        let map = self.entities.entry(kind).or_default();
        if let Some(existing) = map.get(name) {
            return Err(*existing);
        }
        map.insert(name.to_string(), id);
        Ok(())
    }
}

/// Declaration of a namespace for [`crate::ModelBuilder`].
#[derive(Debug, Clone)]
pub struct NamespaceDecl {
    pub name: String,
    pub project_name: Option<String>,
    pub project_version: String,
    pub project_extension: String,
    pub is_extension: bool,
    pub dependencies: Vec<String>,
}

impl NamespaceDecl {
    /// A core data standard namespace.
    pub fn core(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_name: None,
            project_version: "1.0.0".to_string(),
            project_extension: String::new(),
            is_extension: false,
            dependencies: Vec::new(),
        }
    }

    /// An extension namespace. Without an explicit dependency it depends on
    /// the first declared core namespace.
    pub fn extension(name: impl Into<String>, project_extension: impl Into<String>) -> Self {
        Self {
            is_extension: true,
            project_extension: project_extension.into(),
            ..Self::core(name)
        }
    }

    pub fn depends_on(mut self, namespace: impl Into<String>) -> Self {
        self.dependencies.push(namespace.into());
        self
    }

    pub fn project_name(mut self, project_name: impl Into<String>) -> Self {
        self.project_name = Some(project_name.into());
        self
    }

    pub fn project_version(mut self, version: impl Into<String>) -> Self {
        self.project_version = version.into();
        self
    }
}
