//! The `setup` command.
use anyhow::{Context as _, Result};

use super::{STATE_DIR, global_config_path, resolve_root, write_scaffold};
use crate::cli::GlobalOpts;
use crate::config::{Scope, manifest};
use crate::logging::Logger;

/// Run the `setup` command: create the state directory and scaffold
/// `global.json` if it does not exist yet.
///
/// # Errors
///
/// Returns an error if the repository root cannot be found, a manifest is
/// invalid, or a file cannot be written.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let root = resolve_root(global)?;
    log.stage(&format!("Setting up {}", root.display()));

    let state = root.join(STATE_DIR);
    std::fs::create_dir_all(&state)
        .with_context(|| format!("creating directory {}", state.display()))?;

    let manifests = manifest::manifest_paths(&root)?;
    log.info(&format!("Found {} plugin manifest(s)", manifests.len()));

    let global_json = global_config_path(&root);
    if global_json.exists() {
        log.info(&format!("{} already exists", global_json.display()));
    } else {
        let config = manifest::assemble(&root, Scope::Global)?;
        write_scaffold(&global_json, &config, false, log)?;
    }

    log.info("Next: run `dotconfigs deploy` to apply the global configuration");
    Ok(())
}
