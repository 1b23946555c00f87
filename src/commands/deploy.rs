//! The `deploy` command.
use anyhow::Result;

use super::{global_config_path, home_dir, resolve_root};
use crate::cli::{DeployOpts, GlobalOpts};
use crate::engine::{self, DeployOptions, TargetBase};
use crate::error::ProjectError;
use crate::logging::Logger;

/// Run the `deploy` command: deploy `global.json` into the home directory.
///
/// # Errors
///
/// Returns an error if the repository root or home directory cannot be
/// determined, `global.json` is missing or invalid, or a filesystem
/// operation fails.
pub fn run(global: &GlobalOpts, opts: &DeployOpts, log: &Logger) -> Result<()> {
    let root = resolve_root(global)?;
    let home = home_dir()?;
    let config = global_config_path(&root);
    if !config.exists() {
        return Err(ProjectError::GlobalConfigMissing { path: config }.into());
    }

    log.stage("Deploying global configuration");
    log.debug(&format!("repository: {}", root.display()));
    log.debug(&format!("home: {}", home.display()));

    let options = DeployOptions {
        group: opts.group.clone(),
        dry_run: opts.dry_run,
        show_summary: true,
        target_base: TargetBase::Home(home),
    };
    engine::deploy(&config, &root, &options, log)?;
    Ok(())
}
