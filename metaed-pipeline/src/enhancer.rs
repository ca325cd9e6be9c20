//! Enhancer contract.

use metaed_model::PluginId;
use serde::Serialize;
use thiserror::Error;

use crate::{MetaEdEnvironment, VersionGate};

/// Outcome of one enhancer run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancerResult {
    pub enhancer_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
}

impl EnhancerResult {
    pub fn ok(enhancer_name: impl Into<String>) -> Self {
        Self {
            enhancer_name: enhancer_name.into(),
            success: true,
            failure_message: None,
        }
    }

    /// A structural precondition failure. Aborts the compilation.
    pub fn failed(enhancer_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            enhancer_name: enhancer_name.into(),
            success: false,
            failure_message: Some(message.into()),
        }
    }
}

/// Raised when an enhancer reports a structural failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("enhancer '{enhancer_name}' of plugin '{plugin}' failed: {message}")]
pub struct EnhancerFailure {
    pub plugin: PluginId,
    pub enhancer_name: String,
    pub message: String,
}

/// A derivation pass over the resolved model.
///
/// An enhancer runs exactly once per compilation. It reads data written by
/// enhancers that ran before it and writes only its own plugin's data slots.
pub trait Enhancer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Version range this enhancer applies to. `None` always runs.
    fn gate(&self) -> Option<VersionGate> {
        None
    }

    fn enhance(&self, environment: &mut MetaEdEnvironment) -> EnhancerResult;
}
