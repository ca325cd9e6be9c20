//! Pipeline phase trait.

use eyre::Result;

use super::CompilationContext;

/// A phase in the compilation pipeline.
///
/// The pipeline always runs the built-in phases in this order:
/// - `ResolvePhase` - links named references, records unresolved ones
/// - `EnhancePhase` - runs every plugin's enhancers
/// - `ValidatePhase` - runs every plugin's validators
/// - `GeneratePhase` - runs every plugin's generators
pub trait Phase: Send + Sync {
    /// The name of this phase (used in logs and observer hooks).
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Run this phase on the compilation context.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal conditions. Per-item problems are
    /// recorded as failures instead.
    fn run(&self, ctx: &mut CompilationContext) -> Result<()>;
}
