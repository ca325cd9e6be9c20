//! Resolve phase - links named references.

use eyre::Result;
use metaed_model::resolve_references;

use crate::{
    ValidationFailure,
    pipeline::{CompilationContext, Phase},
};

/// Runs reference resolution and reports every unresolved name as an error.
pub struct ResolvePhase;

impl Phase for ResolvePhase {
    fn name(&self) -> &'static str {
        "resolve"
    }

    fn description(&self) -> &'static str {
        "Resolve base entity and property references across namespaces"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let unresolved = resolve_references(&mut ctx.environment.repository);
        ctx.failures.extend(unresolved.into_iter().map(|reference| {
            ValidationFailure::error(
                reference.validator_name,
                reference.message,
                Some(&reference.source_map),
            )
        }));
        Ok(())
    }
}
