//! Compilation configuration loaded from TOML.
//!
//! ```toml
//! data_standard_version = "5.0.0"
//! plugins = [
//!   { name = "unified" },
//!   { name = "edfiOdsRelational", target_technology_version = "7.1.0" },
//! ]
//! ```
//!
//! The `plugins` list is the plugin run order.

use std::{fs, ops::Range, path::Path};

use metaed_core::SemVer;
use metaed_model::{PluginId, Repository};
use serde::Deserialize;
use toml::Spanned;

use crate::{
    MetaEdEnvironment,
    error::{Error, Result, SourceContext},
};

/// One entry of the plugin list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginConfig {
    pub id: PluginId,
    pub target_technology_version: SemVer,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaEdConfig {
    pub data_standard_version: SemVer,
    /// Plugins in run order
    pub plugins: Vec<PluginConfig>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    data_standard_version: Option<Spanned<String>>,
    #[serde(default)]
    plugins: Vec<RawPlugin>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPlugin {
    name: Spanned<String>,
    #[serde(default)]
    target_technology_version: Option<Spanned<String>>,
}

impl MetaEdConfig {
    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|source| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source,
            })
        })?;
        Self::parse(&src, path.display().to_string())
    }

    /// Parse configuration text. `filename` is only used in diagnostics.
    pub fn parse(src: &str, filename: impl Into<String>) -> Result<Self> {
        let ctx = SourceContext::new(src, filename);
        let raw: RawConfig = toml::from_str(src).map_err(|e| ctx.parse_error(e))?;

        let data_standard_version = match &raw.data_standard_version {
            Some(version) => parse_version(&ctx, version)?,
            None => SemVer::default(),
        };

        let mut plugins = Vec::with_capacity(raw.plugins.len());
        let mut seen: Vec<(PluginId, Range<usize>)> = Vec::new();
        for entry in &raw.plugins {
            let id: PluginId = entry
                .name
                .get_ref()
                .parse()
                .map_err(|_| ctx.unknown_plugin_error(entry.name.get_ref(), entry.name.span()))?;

            if let Some((_, first)) = seen.iter().find(|(seen_id, _)| *seen_id == id) {
                return Err(ctx.duplicate_plugin_error(id, first.clone(), entry.name.span()));
            }
            seen.push((id, entry.name.span()));

            let target_technology_version = match &entry.target_technology_version {
                Some(version) => parse_version(&ctx, version)?,
                None => SemVer::default(),
            };
            plugins.push(PluginConfig {
                id,
                target_technology_version,
            });
        }

        Ok(Self {
            data_standard_version,
            plugins,
        })
    }

    pub fn plugin_order(&self) -> Vec<PluginId> {
        self.plugins.iter().map(|p| p.id).collect()
    }

    /// A fresh environment for one compilation of `repository`.
    pub fn environment(&self, repository: Repository) -> MetaEdEnvironment {
        self.plugins.iter().fold(
            MetaEdEnvironment::new(repository, self.data_standard_version),
            |env, plugin| env.with_plugin_version(plugin.id, plugin.target_technology_version),
        )
    }
}

fn parse_version(ctx: &SourceContext, version: &Spanned<String>) -> Result<SemVer> {
    version
        .get_ref()
        .parse()
        .map_err(|_| ctx.invalid_version_error(version.get_ref(), version.span()))
}
