//! Core types and utilities for the MetaEd model compiler.
//!
//! This crate provides the semantic version gate shared by every
//! version-sensitive enhancer, validator, and generator, along with the
//! naming helpers and generator output records used across the workspace.

mod output;
mod utils;
mod version;

// Generator output
pub use output::GeneratedOutput;
// String utilities
pub use utils::{capitalize, decapitalize, pluralize, to_snake_case};
// Version gating
pub use version::{
    Comparator, Operator, SemVer, V5_4_OR_GREATER, V7_OR_GREATER,
    VersionError, VersionRange, satisfies,
};
