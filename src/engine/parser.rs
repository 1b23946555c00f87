//! Flatten a configuration document into deployment instructions.
use crate::config::{DeployConfig, EffectiveSet, Method};

/// One module ready to deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Plugin (top-level key) the module belongs to.
    pub plugin: String,
    /// Module name within the plugin.
    pub module: String,
    /// Source path relative to the repository root.
    pub source: String,
    /// Target path as configured, before resolution.
    pub target: String,
    /// Materialization method.
    pub method: Method,
    /// Files to deploy.
    pub files: EffectiveSet,
}

impl Instruction {
    /// `plugin/module`, used in log lines.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}/{}", self.plugin, self.module)
    }
}

/// Flatten `config` into instructions in document order.
///
/// With a non-empty `group` only modules under that plugin are emitted; an
/// unknown group yields nothing.
#[must_use]
pub fn parse_modules(config: &DeployConfig, group: Option<&str>) -> Vec<Instruction> {
    let group = group.filter(|g| !g.is_empty());

    config
        .plugins
        .iter()
        .filter(|(plugin, _)| group.is_none_or(|g| g == plugin.as_str()))
        .flat_map(|(plugin, modules)| {
            modules.iter().map(move |(name, spec)| Instruction {
                plugin: plugin.clone(),
                module: name.clone(),
                source: spec.source.clone(),
                target: spec.target.clone(),
                method: spec.method,
                files: spec.effective_set(),
            })
        })
        .collect()
}
