//! Assembly of configuration documents from per-plugin manifests.
//!
//! Each plugin directory may carry a `manifest.json` with optional `global`
//! and `project` sections, each an object of modules. Assembly merges one
//! section across all plugins into a [`DeployConfig`].
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

use super::{DeployConfig, PluginModules};
use crate::error::DeployError;

/// Directory under the repository root that holds plugins.
pub const PLUGINS_DIR: &str = "plugins";

/// Manifest filename inside each plugin directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Which manifest section to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Modules deployed into the home directory.
    Global,
    /// Modules deployed into a project's working tree.
    Project,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Project => f.write_str("project"),
        }
    }
}

/// On-disk shape of `plugins/<name>/manifest.json`.
#[derive(Debug, Default, Deserialize)]
struct PluginManifest {
    #[serde(default)]
    global: Option<PluginModules>,
    #[serde(default)]
    project: Option<PluginModules>,
}

impl PluginManifest {
    fn take(self, scope: Scope) -> Option<PluginModules> {
        match scope {
            Scope::Global => self.global,
            Scope::Project => self.project,
        }
    }
}

/// Paths of every plugin manifest under `repo_root`, sorted by plugin name.
///
/// # Errors
///
/// Returns an error if the plugins directory exists but cannot be listed.
pub fn manifest_paths(repo_root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let plugins = repo_root.join(PLUGINS_DIR);
    if !plugins.is_dir() {
        return Ok(Vec::new());
    }
    let mut paths: Vec<PathBuf> = std::fs::read_dir(&plugins)
        .with_context(|| format!("reading {}", plugins.display()))?
        .filter_map(Result::ok)
        .map(|entry| entry.path().join(MANIFEST_FILE))
        .filter(|p| p.is_file())
        .collect();
    paths.sort();
    Ok(paths)
}

/// Merge one manifest section across all plugins.
///
/// Plugins appear in sorted directory order and modules in manifest order.
/// Plugins without the requested section are omitted. For
/// [`Scope::Project`] every module with an `include` list is given an
/// explicit empty `exclude` list to customise.
///
/// # Errors
///
/// Returns [`DeployError::ConfigInvalid`] naming the manifest path when a
/// manifest is malformed, or [`DeployError::Filesystem`] if it cannot be read.
pub fn assemble(repo_root: &Path, scope: Scope) -> Result<DeployConfig, DeployError> {
    let mut config = DeployConfig::default();

    for path in manifest_paths(repo_root)? {
        let Some(plugin) = path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
        else {
            continue;
        };

        let content =
            std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let manifest: PluginManifest =
            serde_json::from_str(&content).map_err(|e| DeployError::ConfigInvalid {
                path: path.clone(),
                message: e.to_string(),
            })?;

        let Some(mut modules) = manifest.take(scope) else {
            continue;
        };

        for (name, module) in &mut modules {
            module.check().map_err(|reason| DeployError::ConfigInvalid {
                path: path.clone(),
                message: format!("{scope}.{name}: {reason}"),
            })?;
            if scope == Scope::Project && module.include.is_some() && module.exclude.is_none() {
                module.exclude = Some(Vec::new());
            }
        }

        config.plugins.insert(plugin, modules);
    }

    Ok(config)
}
