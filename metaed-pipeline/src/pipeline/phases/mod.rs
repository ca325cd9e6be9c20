//! Built-in pipeline phases.
//!
//! - [`ResolvePhase`] - links named references across namespaces
//! - [`EnhancePhase`] - derives plugin data, plugin by plugin
//! - [`ValidatePhase`] - collects validation failures
//! - [`GeneratePhase`] - renders artifacts from the enhanced model

mod enhance;
mod generate;
mod resolve;
mod validate;

pub use enhance::EnhancePhase;
pub use generate::GeneratePhase;
pub use resolve::ResolvePhase;
pub use validate::ValidatePhase;

use metaed_model::PluginId;

use crate::PluginComponents;

/// A registered plugin after initialization.
#[derive(Debug)]
pub struct LoadedPlugin {
    pub id: PluginId,
    pub components: PluginComponents,
}
