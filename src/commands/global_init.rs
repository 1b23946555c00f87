//! The `global-init` command.
use anyhow::Result;

use super::{global_config_path, resolve_root, write_scaffold};
use crate::cli::{GlobalOpts, InitOpts};
use crate::config::{Scope, manifest};
use crate::logging::Logger;

/// Run the `global-init` command: scaffold `<repo>/.dotconfigs/global.json`
/// from the plugin manifests' `global` sections.
///
/// # Errors
///
/// Returns an error if a manifest is invalid or the file cannot be written.
pub fn run(global: &GlobalOpts, opts: &InitOpts, log: &Logger) -> Result<()> {
    let root = resolve_root(global)?;
    log.stage("Initialising global configuration");
    let config = manifest::assemble(&root, Scope::Global)?;
    write_scaffold(&global_config_path(&root), &config, opts.force, log)?;
    Ok(())
}
