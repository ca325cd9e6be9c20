//! Pipeline orchestrator.

use eyre::Result;
use indexmap::IndexMap;
use metaed_core::SemVer;
use metaed_model::PluginId;
use thiserror::Error;
use tracing::{info, info_span};

use super::{
    CompilationContext, Observer, Phase,
    phases::{EnhancePhase, GeneratePhase, LoadedPlugin, ResolvePhase, ValidatePhase},
};
use crate::{MetaEdConfig, MetaEdEnvironment, MetaEdPlugin};

/// Invalid plugin registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginOrderError {
    #[error("plugin '{plugin}' is registered more than once")]
    Duplicate { plugin: PluginId },

    #[error("plugin '{plugin}' depends on '{dependency}', which must be registered before it")]
    MissingDependency { plugin: PluginId, dependency: PluginId },

    #[error("plugin '{plugin}' is configured but not available")]
    NotAvailable { plugin: PluginId },
}

/// The compilation pipeline orchestrator.
///
/// Plugins run in the order they are registered. That order is the single
/// source of truth for cross-plugin sequencing; declared dependencies are
/// checked against it but never used to reorder.
///
/// ```ignore
/// let ctx = Pipeline::new()
///     .plugin(UnifiedPlugin)
///     .plugin(RelationalPlugin)
///     .plugin(ApiSchemaPlugin)
///     .observer(snapshots.clone())
///     .run(environment)?;
/// ```
pub struct Pipeline {
    plugins: Vec<Box<dyn MetaEdPlugin>>,
    observers: Vec<Box<dyn Observer>>,
    plugin_versions: IndexMap<PluginId, SemVer>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            observers: Vec::new(),
            plugin_versions: IndexMap::new(),
        }
    }

    /// Build a pipeline from `available` plugins, ordered by the configured plugin list.
    ///
    /// Configured target technology versions are applied to the environment
    /// when the pipeline runs, unless the environment already sets them.
    pub fn from_config(
        config: &MetaEdConfig,
        available: Vec<Box<dyn MetaEdPlugin>>,
    ) -> Result<Self> {
        let mut available: IndexMap<PluginId, Box<dyn MetaEdPlugin>> =
            available.into_iter().map(|p| (p.id(), p)).collect();

        let mut pipeline = Self::new();
        for entry in &config.plugins {
            let plugin = available
                .shift_remove(&entry.id)
                .ok_or(PluginOrderError::NotAvailable { plugin: entry.id })?;
            pipeline.plugins.push(plugin);
            pipeline
                .plugin_versions
                .insert(entry.id, entry.target_technology_version);
        }
        Ok(pipeline)
    }

    /// Register a plugin to run after those already registered.
    pub fn plugin(mut self, plugin: impl MetaEdPlugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Add an observer to receive phase lifecycle hooks.
    pub fn observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Registered plugins in run order.
    pub fn plugin_order(&self) -> Vec<PluginId> {
        self.plugins.iter().map(|p| p.id()).collect()
    }

    /// Check that no plugin is registered twice and every dependency runs first.
    pub fn validate_order(&self) -> std::result::Result<(), PluginOrderError> {
        let mut registered: Vec<PluginId> = Vec::new();
        for plugin in &self.plugins {
            let id = plugin.id();
            if registered.contains(&id) {
                return Err(PluginOrderError::Duplicate { plugin: id });
            }
            if let Some(dependency) = plugin
                .dependencies()
                .iter()
                .find(|dependency| !registered.contains(dependency))
            {
                return Err(PluginOrderError::MissingDependency {
                    plugin: id,
                    dependency: *dependency,
                });
            }
            registered.push(id);
        }
        Ok(())
    }

    /// Run a compilation.
    ///
    /// Executes the phases in order:
    /// 1. resolve
    /// 2. enhance
    /// 3. validate
    /// 4. generate
    ///
    /// Observer hooks are called before and after each phase.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid plugin order, a structural enhancer
    /// failure ([`crate::EnhancerFailure`]), a generator error, or an
    /// observer error. Validation failures are not errors.
    pub fn run(&self, mut environment: MetaEdEnvironment) -> Result<CompilationContext> {
        self.validate_order()?;

        for (plugin, version) in &self.plugin_versions {
            environment.plugin_versions.entry(*plugin).or_insert(*version);
        }

        let loaded: Vec<LoadedPlugin> = self
            .plugins
            .iter()
            .map(|plugin| LoadedPlugin {
                id: plugin.id(),
                components: plugin.initialize(),
            })
            .collect();

        let mut ctx = CompilationContext::new(environment);
        let phases: [&dyn Phase; 4] = [
            &ResolvePhase,
            &EnhancePhase::new(&loaded),
            &ValidatePhase::new(&loaded),
            &GeneratePhase::new(&loaded),
        ];
        for phase in phases {
            self.run_phase(phase, &mut ctx)?;
        }

        info!(
            errors = ctx.error_count(),
            warnings = ctx.warning_count(),
            "compilation complete"
        );
        Ok(ctx)
    }

    /// Run a single phase with observer hooks.
    fn run_phase(&self, phase: &dyn Phase, ctx: &mut CompilationContext) -> Result<()> {
        let phase_name = phase.name();
        let _span = info_span!("phase", phase = phase_name).entered();
        info!(description = phase.description(), "starting phase");

        for observer in &self.observers {
            observer.on_before_phase(phase_name, ctx)?;
        }

        phase.run(ctx)?;

        for observer in &self.observers {
            observer.on_after_phase(phase_name, ctx)?;
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
