//! The `project-init` command and the git exclude entry it maintains.
use std::io::Write as _;
use std::path::Path;

use anyhow::{Context as _, Result};

use super::{STATE_DIR, project_config_path, require_git_repo, resolve_project_dir, resolve_root};
use crate::cli::{GlobalOpts, ProjectInitOpts};
use crate::config::{Scope, manifest};
use crate::logging::Logger;

/// Pattern appended to `info/exclude` so project state is never committed.
const EXCLUDE_PATTERN: &str = ".dotconfigs/";

/// Run the `project-init` command.
///
/// Scaffolds `.dotconfigs/project.json` from the plugin manifests' `project`
/// sections and excludes `.dotconfigs/` from git. Safe to re-run.
///
/// # Errors
///
/// Returns an error if the directory is not a git repository, a manifest is
/// invalid, or a file cannot be written.
pub fn run(global: &GlobalOpts, opts: &ProjectInitOpts, log: &Logger) -> Result<()> {
    let root = resolve_root(global)?;
    let project = resolve_project_dir(opts.dir.as_deref())?;
    let repo = require_git_repo(&project)?;

    log.stage(&format!("Initialising {}", project.join(STATE_DIR).display()));
    let config = manifest::assemble(&root, Scope::Project)?;
    super::write_scaffold(&project_config_path(&project), &config, opts.force, log)?;

    let exclude = repo.path().join("info").join("exclude");
    if ensure_excluded(&exclude)? {
        log.info(&format!("Added {EXCLUDE_PATTERN} to {}", exclude.display()));
    } else {
        log.debug(&format!("{EXCLUDE_PATTERN} already in {}", exclude.display()));
    }
    Ok(())
}

/// Append [`EXCLUDE_PATTERN`] to a git exclude file unless already listed.
///
/// Returns whether the file was changed.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, or cannot be
/// written.
pub fn ensure_excluded(exclude: &Path) -> Result<bool> {
    let existing = match std::fs::read_to_string(exclude) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(e).with_context(|| format!("reading {}", exclude.display()));
        }
    };

    let bare = EXCLUDE_PATTERN.trim_end_matches('/');
    let anchored = format!("/{EXCLUDE_PATTERN}");
    if existing
        .lines()
        .map(str::trim)
        .any(|l| l == EXCLUDE_PATTERN || l == bare || l == anchored)
    {
        return Ok(false);
    }

    if let Some(parent) = exclude.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(exclude)
        .with_context(|| format!("opening {}", exclude.display()))?;
    let separator = if existing.is_empty() || existing.ends_with('\n') {
        ""
    } else {
        "\n"
    };
    writeln!(file, "{separator}{EXCLUDE_PATTERN}")
        .with_context(|| format!("writing {}", exclude.display()))?;
    Ok(true)
}
