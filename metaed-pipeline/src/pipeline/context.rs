//! Compilation context passed through pipeline phases.

use indexmap::IndexMap;
use metaed_core::GeneratedOutput;
use metaed_model::PluginId;

use crate::{EnhancerResult, MetaEdEnvironment, ValidationFailure};

/// State of one compilation, threaded through every phase.
#[derive(Debug)]
pub struct CompilationContext {
    /// The model and its versions.
    pub environment: MetaEdEnvironment,
    /// Results of the enhancers that ran, in run order.
    pub enhancer_results: Vec<EnhancerResult>,
    /// Diagnostics from resolution and validation, in run order.
    pub failures: Vec<ValidationFailure>,
    /// Generator outputs grouped by plugin.
    pub outputs: IndexMap<PluginId, Vec<GeneratedOutput>>,
}

impl CompilationContext {
    pub fn new(environment: MetaEdEnvironment) -> Self {
        Self {
            environment,
            enhancer_results: Vec::new(),
            failures: Vec::new(),
            outputs: IndexMap::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.failures.iter().any(|f| f.category.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.failures.iter().any(|f| f.category.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationFailure> {
        self.failures.iter().filter(|f| f.category.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationFailure> {
        self.failures.iter().filter(|f| f.category.is_warning())
    }

    /// Find a generated file by plugin and file name.
    pub fn output(&self, plugin: PluginId, file_name: &str) -> Option<&GeneratedOutput> {
        self.outputs
            .get(&plugin)?
            .iter()
            .find(|output| output.file_name == file_name)
    }
}
