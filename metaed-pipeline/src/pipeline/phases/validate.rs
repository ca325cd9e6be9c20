//! Validate phase - runs validators plugin by plugin.

use eyre::Result;
use metaed_model::Namespace;
use tracing::{debug, info_span};

use super::LoadedPlugin;
use crate::pipeline::{CompilationContext, Phase};

/// Runs each plugin's validators and appends their failures in run order.
///
/// Failures never abort the compilation; the full list is reported at once.
pub struct ValidatePhase<'a> {
    plugins: &'a [LoadedPlugin],
}

impl<'a> ValidatePhase<'a> {
    pub fn new(plugins: &'a [LoadedPlugin]) -> Self {
        Self { plugins }
    }
}

impl Phase for ValidatePhase<'_> {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn description(&self) -> &'static str {
        "Check the enhanced model and collect failures"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        for plugin in self.plugins {
            let _span = info_span!("plugin", plugin = %plugin.id).entered();

            for validator in &plugin.components.validators {
                if let Some(gate) = validator.gate()
                    && !gate.is_satisfied(&ctx.environment)
                {
                    debug!(validator = validator.name(), range = gate.range(), "gate not satisfied, skipping");
                    continue;
                }

                let scope = validator.scope();
                let failures = {
                    let namespaces: Vec<&Namespace> = ctx
                        .environment
                        .repository
                        .namespaces()
                        .filter(|namespace| scope.includes(namespace))
                        .collect();
                    validator.validate(&ctx.environment, &namespaces)
                };
                debug!(validator = validator.name(), failures = failures.len(), "validator ran");
                ctx.failures.extend(failures);
            }
        }
        Ok(())
    }
}
