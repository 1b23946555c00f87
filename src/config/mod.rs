//! Configuration documents: loading, module schema, and manifest assembly.
pub mod effective;
pub mod manifest;
pub mod module;
pub mod validation;

use std::path::Path;

use anyhow::Context as _;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::DeployError;

pub use effective::EffectiveSet;
pub use manifest::Scope;
pub use module::{Method, ModuleSpec};

/// Modules of one plugin, keyed by module name in document order.
pub type PluginModules = IndexMap<String, ModuleSpec>;

/// A deployment configuration: plugin name → module name → module.
///
/// Both levels preserve the order of the JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeployConfig {
    /// Plugins in document order.
    pub plugins: IndexMap<String, PluginModules>,
}

impl DeployConfig {
    /// Total number of modules across all plugins.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.plugins.values().map(IndexMap::len).sum()
    }

    /// Whether the configuration declares no modules at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.module_count() == 0
    }
}

/// Load a configuration document from disk.
///
/// # Errors
///
/// - [`DeployError::ConfigMissing`] if `path` does not exist.
/// - [`DeployError::ConfigInvalid`] if it is not valid JSON or violates the
///   module schema.
/// - [`DeployError::Filesystem`] if it exists but cannot be read.
pub fn load(path: &Path) -> Result<DeployConfig, DeployError> {
    if !path.exists() {
        return Err(DeployError::ConfigMissing {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_str(&content, path)
}

/// Parse a configuration document from a string; `path` is used for errors.
///
/// # Errors
///
/// Returns [`DeployError::ConfigInvalid`] on malformed JSON or schema
/// violations.
pub fn parse_str(content: &str, path: &Path) -> Result<DeployConfig, DeployError> {
    let invalid = |message: String| DeployError::ConfigInvalid {
        path: path.to_path_buf(),
        message,
    };

    let config: DeployConfig = serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;

    for (plugin, modules) in &config.plugins {
        for (name, module) in modules {
            module
                .check()
                .map_err(|reason| invalid(format!("{plugin}.{name}: {reason}")))?;
        }
    }
    Ok(config)
}

/// Write a configuration document as pretty-printed JSON, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns an error if serialization or any filesystem write fails.
pub fn save(path: &Path, config: &DeployConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let mut json = serde_json::to_string_pretty(config).context("serializing configuration")?;
    json.push('\n');
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}
