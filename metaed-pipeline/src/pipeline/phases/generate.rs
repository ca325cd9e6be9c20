//! Generate phase - renders artifacts.

use eyre::{Result, WrapErr};
use tracing::{debug, info_span};

use super::LoadedPlugin;
use crate::pipeline::{CompilationContext, Phase};

/// Runs each plugin's generators and groups their outputs by plugin.
pub struct GeneratePhase<'a> {
    plugins: &'a [LoadedPlugin],
}

impl<'a> GeneratePhase<'a> {
    pub fn new(plugins: &'a [LoadedPlugin]) -> Self {
        Self { plugins }
    }
}

impl Phase for GeneratePhase<'_> {
    fn name(&self) -> &'static str {
        "generate"
    }

    fn description(&self) -> &'static str {
        "Render artifacts from the enhanced model"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        for plugin in self.plugins {
            let _span = info_span!("plugin", plugin = %plugin.id).entered();

            let mut outputs = Vec::new();
            for generator in &plugin.components.generators {
                let generated = generator
                    .generate(&ctx.environment)
                    .wrap_err_with(|| format!("generator '{}' failed", generator.name()))?;
                debug!(generator = generator.name(), files = generated.len(), "generator ran");
                outputs.extend(generated);
            }
            if !outputs.is_empty() {
                ctx.outputs.entry(plugin.id).or_default().extend(outputs);
            }
        }
        Ok(())
    }
}
