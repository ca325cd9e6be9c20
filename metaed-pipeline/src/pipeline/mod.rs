//! Compilation pipeline.
//!
//! A [`Pipeline`] takes a freshly built model through four fixed phases:
//!
//! - resolve: link named references under namespace visibility rules
//! - enhance: run each plugin's enhancers in registration order
//! - validate: collect failures from each plugin's validators
//! - generate: render artifacts from the enhanced model
//!
//! [`Observer`]s are called before and after each phase. Structural
//! enhancer failures abort the run; everything else accumulates in the
//! [`CompilationContext`].

mod context;
mod observer;
mod phase;
pub mod phases;
mod runner;
mod snapshot;

pub use context::CompilationContext;
pub use observer::Observer;
pub use phase::Phase;
pub use runner::{Pipeline, PluginOrderError};
pub use snapshot::{PhaseSnapshot, SnapshotObserver};
