//! Plugin registration.

use eyre::Result;
use metaed_core::GeneratedOutput;
use metaed_model::PluginId;

use crate::{Enhancer, MetaEdEnvironment, Validator};

/// Serializes the enhanced model into artifacts. Never mutates the model.
pub trait Generator: Send + Sync {
    fn name(&self) -> &'static str;

    fn generate(&self, environment: &MetaEdEnvironment) -> Result<Vec<GeneratedOutput>>;
}

/// The passes a plugin contributes, each list in execution order.
#[derive(Default)]
pub struct PluginComponents {
    pub enhancers: Vec<Box<dyn Enhancer>>,
    pub validators: Vec<Box<dyn Validator>>,
    pub generators: Vec<Box<dyn Generator>>,
}

impl PluginComponents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enhancer(mut self, enhancer: impl Enhancer + 'static) -> Self {
        self.enhancers.push(Box::new(enhancer));
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn generator(mut self, generator: impl Generator + 'static) -> Self {
        self.generators.push(Box::new(generator));
        self
    }
}

impl std::fmt::Debug for PluginComponents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginComponents")
            .field(
                "enhancers",
                &self.enhancers.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .field(
                "validators",
                &self.validators.iter().map(|v| v.name()).collect::<Vec<_>>(),
            )
            .field(
                "generators",
                &self.generators.iter().map(|g| g.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// A bundle of enhancers, validators, and generators.
///
/// Plugins are run in the order they are registered with the pipeline.
/// [`MetaEdPlugin::dependencies`] is only checked against that order, never
/// used to compute it.
pub trait MetaEdPlugin: Send + Sync {
    fn id(&self) -> PluginId;

    /// Plugins whose data this plugin reads. They must be registered earlier.
    fn dependencies(&self) -> &'static [PluginId] {
        &[]
    }

    fn initialize(&self) -> PluginComponents;
}
