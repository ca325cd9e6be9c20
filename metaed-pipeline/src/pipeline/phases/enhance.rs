//! Enhance phase - runs enhancers plugin by plugin.

use eyre::Result;
use tracing::{debug, info_span};

use super::LoadedPlugin;
use crate::{
    EnhancerFailure,
    pipeline::{CompilationContext, Phase},
};

/// Runs each plugin's enhancers in declared order, plugins in registration order.
///
/// Enhancers whose version gate is not satisfied are skipped. The first
/// enhancer reporting failure aborts the compilation.
pub struct EnhancePhase<'a> {
    plugins: &'a [LoadedPlugin],
}

impl<'a> EnhancePhase<'a> {
    pub fn new(plugins: &'a [LoadedPlugin]) -> Self {
        Self { plugins }
    }
}

impl Phase for EnhancePhase<'_> {
    fn name(&self) -> &'static str {
        "enhance"
    }

    fn description(&self) -> &'static str {
        "Derive plugin data from the resolved model"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        for plugin in self.plugins {
            let _span = info_span!("plugin", plugin = %plugin.id).entered();

            for enhancer in &plugin.components.enhancers {
                if let Some(gate) = enhancer.gate()
                    && !gate.is_satisfied(&ctx.environment)
                {
                    debug!(enhancer = enhancer.name(), range = gate.range(), "gate not satisfied, skipping");
                    continue;
                }

                let result = enhancer.enhance(&mut ctx.environment);
                debug!(enhancer = enhancer.name(), success = result.success, "enhancer ran");

                if !result.success {
                    return Err(EnhancerFailure {
                        plugin: plugin.id,
                        enhancer_name: result.enhancer_name,
                        message: result.failure_message.unwrap_or_default(),
                    }
                    .into());
                }
                ctx.enhancer_results.push(result);
            }
        }
        Ok(())
    }
}
