//! Per-compilation environment and version gates.

use indexmap::IndexMap;
use metaed_core::{SemVer, satisfies};
use metaed_model::{PluginId, Repository};

/// Everything one compilation run works on.
///
/// Built fresh for every run and never shared between runs.
#[derive(Debug)]
pub struct MetaEdEnvironment {
    pub repository: Repository,
    pub data_standard_version: SemVer,
    /// Configured target technology version per plugin
    pub plugin_versions: IndexMap<PluginId, SemVer>,
}

impl MetaEdEnvironment {
    pub fn new(repository: Repository, data_standard_version: SemVer) -> Self {
        Self {
            repository,
            data_standard_version,
            plugin_versions: IndexMap::new(),
        }
    }

    /// Set the target technology version of one plugin.
    pub fn with_plugin_version(mut self, plugin: PluginId, version: SemVer) -> Self {
        self.plugin_versions.insert(plugin, version);
        self
    }

    /// The plugin's target technology version, `0.0.0` when not configured.
    pub fn target_technology_version(&self, plugin: PluginId) -> SemVer {
        self.plugin_versions
            .get(&plugin)
            .copied()
            .unwrap_or_default()
    }
}

/// Applicability predicate for a version-sensitive enhancer or validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionGate {
    /// Range over the data standard version
    DataStandard(&'static str),
    /// Range over one plugin's target technology version
    TargetTechnology(PluginId, &'static str),
}

impl VersionGate {
    pub fn is_satisfied(&self, environment: &MetaEdEnvironment) -> bool {
        match self {
            VersionGate::DataStandard(range) => {
                satisfies(&environment.data_standard_version, range)
            }
            VersionGate::TargetTechnology(plugin, range) => {
                satisfies(&environment.target_technology_version(*plugin), range)
            }
        }
    }

    pub fn range(&self) -> &'static str {
        match self {
            VersionGate::DataStandard(range) | VersionGate::TargetTechnology(_, range) => range,
        }
    }
}

#[cfg(test)]
mod tests {
    use metaed_core::V5_4_OR_GREATER;

    use super::*;

    fn environment(version: SemVer) -> MetaEdEnvironment {
        MetaEdEnvironment::new(Repository::new(), SemVer::new(5, 0, 0))
            .with_plugin_version(PluginId::EdfiOdsRelational, version)
    }

    #[test]
    fn test_unconfigured_plugin_defaults_to_zero() {
        let env = MetaEdEnvironment::new(Repository::new(), SemVer::new(5, 0, 0));
        assert_eq!(env.target_technology_version(PluginId::EdfiApiSchema), SemVer::new(0, 0, 0));
    }

    #[test]
    fn test_target_technology_gate_boundary() {
        let gate = VersionGate::TargetTechnology(PluginId::EdfiOdsRelational, V5_4_OR_GREATER);
        assert!(gate.is_satisfied(&environment(SemVer::new(5, 4, 0))));
        assert!(!gate.is_satisfied(&environment(SemVer::new(5, 3, 9))));
    }

    #[test]
    fn test_data_standard_gate() {
        let env = environment(SemVer::new(7, 1, 0));
        assert!(VersionGate::DataStandard(">=3.3.0 <7.1.0").is_satisfied(&env));
        assert!(!VersionGate::DataStandard("2.x").is_satisfied(&env));
    }
}
