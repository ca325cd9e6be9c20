//! Phase snapshots for debugging a compilation.
//!
//! [`SnapshotObserver`] records a summary of the compilation state after
//! each phase and can write the summaries to disk as pretty JSON.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use eyre::Result;
use serde::Serialize;

use super::{CompilationContext, Observer};
use crate::{EnhancerResult, ValidationFailure};

/// Compilation state after one phase.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSnapshot {
    pub phase: String,
    pub namespaces: Vec<String>,
    pub entity_count: usize,
    pub enhancer_results: Vec<EnhancerResult>,
    pub failures: Vec<ValidationFailure>,
    /// `plugin/folder/file` of every generated artifact so far
    pub outputs: Vec<String>,
}

impl PhaseSnapshot {
    fn capture(phase: &str, ctx: &CompilationContext) -> Self {
        let repository = &ctx.environment.repository;
        Self {
            phase: phase.to_string(),
            namespaces: repository.namespace_names(),
            entity_count: repository.entity_count(),
            enhancer_results: ctx.enhancer_results.clone(),
            failures: ctx.failures.clone(),
            outputs: ctx
                .outputs
                .iter()
                .flat_map(|(plugin, outputs)| {
                    outputs
                        .iter()
                        .map(move |output| format!("{}/{}", plugin, output.relative_path()))
                })
                .collect(),
        }
    }
}

/// An observer that captures a [`PhaseSnapshot`] after each phase.
///
/// ```ignore
/// let snapshots = Arc::new(SnapshotObserver::new());
/// let ctx = Pipeline::new().observer(snapshots.clone()).run(environment)?;
/// snapshots.write_to_dir("target/metaed-debug")?;
/// ```
#[derive(Debug, Default)]
pub struct SnapshotObserver {
    snapshots: RwLock<Vec<PhaseSnapshot>>,
    output_dir: Option<PathBuf>,
}

impl SnapshotObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write each snapshot to `dir` as soon as it is captured.
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshots: RwLock::new(Vec::new()),
            output_dir: Some(output_dir.into()),
        }
    }

    pub fn snapshots(&self) -> Vec<PhaseSnapshot> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Write all snapshots to `dir`, one `{phase}.json` per phase.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        for snapshot in self
            .snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
        {
            write_snapshot(dir, snapshot)?;
        }
        Ok(())
    }
}

fn write_snapshot(dir: &Path, snapshot: &PhaseSnapshot) -> Result<()> {
    let path = dir.join(format!("{}.json", snapshot.phase));
    fs::write(&path, serde_json::to_string_pretty(snapshot)?)?;
    Ok(())
}

impl Observer for SnapshotObserver {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn on_after_phase(&self, phase: &str, ctx: &mut CompilationContext) -> Result<()> {
        let snapshot = PhaseSnapshot::capture(phase, ctx);
        if let Some(dir) = &self.output_dir {
            fs::create_dir_all(dir)?;
            write_snapshot(dir, &snapshot)?;
        }
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(snapshot);
        Ok(())
    }
}
