//! Validator contract.

use metaed_model::Namespace;

use crate::{MetaEdEnvironment, ValidationFailure, VersionGate};

/// Which namespaces a validator is handed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamespaceScope {
    #[default]
    All,
    /// Non-extension namespaces only
    CoreOnly,
}

impl NamespaceScope {
    pub fn includes(&self, namespace: &Namespace) -> bool {
        match self {
            NamespaceScope::All => true,
            NamespaceScope::CoreOnly => !namespace.is_extension,
        }
    }
}

/// A read-only rule check producing diagnostics.
pub trait Validator: Send + Sync {
    fn name(&self) -> &'static str;

    fn scope(&self) -> NamespaceScope {
        NamespaceScope::All
    }

    fn gate(&self) -> Option<VersionGate> {
        None
    }

    /// Check the given namespaces. Failures must be returned in a stable order.
    fn validate(
        &self,
        environment: &MetaEdEnvironment,
        namespaces: &[&Namespace],
    ) -> Vec<ValidationFailure>;
}
