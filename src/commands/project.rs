//! The `project` command.
use anyhow::Result;

use super::{project_config_path, require_git_repo, resolve_project_dir, resolve_root};
use crate::cli::{GlobalOpts, ProjectOpts};
use crate::engine::{self, DeployOptions, TargetBase};
use crate::error::ProjectError;
use crate::logging::Logger;

/// Run the `project` command: deploy `project.json` into a project.
///
/// # Errors
///
/// Returns an error if the directory is not a git repository, has no
/// `project.json`, or deployment fails.
pub fn run(global: &GlobalOpts, opts: &ProjectOpts, log: &Logger) -> Result<()> {
    let root = resolve_root(global)?;
    let project = resolve_project_dir(opts.dir.as_deref())?;
    require_git_repo(&project)?;

    let config = project_config_path(&project);
    if !config.exists() {
        return Err(ProjectError::ProjectConfigMissing { path: config }.into());
    }

    log.stage(&format!("Deploying project configuration to {}", project.display()));

    let options = DeployOptions {
        group: opts.deploy.group.clone(),
        dry_run: opts.deploy.dry_run,
        show_summary: true,
        target_base: TargetBase::Project(project),
    };
    engine::deploy(&config, &root, &options, log)?;
    Ok(())
}
