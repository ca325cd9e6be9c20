//! Orchestration of the MetaEd model compiler.
//!
//! Plugins contribute [`Enhancer`]s, [`Validator`]s and [`Generator`]s.
//! The [`Pipeline`] runs them over a [`MetaEdEnvironment`] in the
//! hand-maintained plugin order, gating version-sensitive passes through
//! [`VersionGate`].

mod config;
mod enhancer;
mod environment;
mod error;
mod failure;
pub mod pipeline;
mod plugin;
mod validator;

pub use config::{MetaEdConfig, PluginConfig};
pub use enhancer::{Enhancer, EnhancerFailure, EnhancerResult};
pub use environment::{MetaEdEnvironment, VersionGate};
pub use error::{Error, Result, SourceContext};
pub use failure::{Category, FileMap, ValidationFailure};
pub use pipeline::{
    CompilationContext, Observer, PhaseSnapshot, Pipeline, PluginOrderError, SnapshotObserver,
};
pub use plugin::{Generator, MetaEdPlugin, PluginComponents};
pub use validator::{NamespaceScope, Validator};
