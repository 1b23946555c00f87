//! Subcommand implementations and the path resolution they share.
//!
//! Each submodule exposes a `run` function taking the parsed options and a
//! [`Logger`]; errors are returned as [`anyhow::Error`] and mapped to an exit
//! status by the binary.
pub mod deploy;
pub mod global_init;
pub mod project;
pub mod project_init;
pub mod setup;
pub mod status;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::{self, DeployConfig};
use crate::error::ProjectError;
use crate::logging::Logger;

/// Per-repository and per-project state directory.
pub const STATE_DIR: &str = ".dotconfigs";

/// Global configuration filename inside [`STATE_DIR`].
pub const GLOBAL_CONFIG: &str = "global.json";

/// Project configuration filename inside [`STATE_DIR`].
pub const PROJECT_CONFIG: &str = "project.json";

/// `<repo>/.dotconfigs/global.json`.
#[must_use]
pub fn global_config_path(repo_root: &Path) -> PathBuf {
    repo_root.join(STATE_DIR).join(GLOBAL_CONFIG)
}

/// `<project>/.dotconfigs/project.json`.
#[must_use]
pub fn project_config_path(project: &Path) -> PathBuf {
    project.join(STATE_DIR).join(PROJECT_CONFIG)
}

/// Locate the dotconfigs repository root.
///
/// Tries, in order: `--root`, `DOTCONFIGS_ROOT`, locations relative to the
/// running binary, and the current directory. Candidates other than an
/// explicit override must contain a `plugins/` directory.
///
/// # Errors
///
/// Returns an error if no candidate is found or the chosen path cannot be
/// canonicalized.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(ref root) = global.root {
        return dunce::canonicalize(root)
            .with_context(|| format!("resolving --root {}", root.display()));
    }

    if let Ok(root) = std::env::var("DOTCONFIGS_ROOT") {
        return dunce::canonicalize(&root)
            .with_context(|| format!("resolving DOTCONFIGS_ROOT {root}"));
    }

    let is_repo = |p: &Path| p.join(config::manifest::PLUGINS_DIR).is_dir();

    if let Ok(exe) = std::env::current_exe()
        && let Some(parent) = exe.parent()
    {
        let candidates = [
            parent.join("../.."), // target/release/ → repo root
            parent.join(".."),    // bin/ → repo root
        ];
        for candidate in &candidates {
            if is_repo(candidate) {
                return Ok(dunce::canonicalize(candidate)?);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    if is_repo(&cwd) {
        return Ok(dunce::canonicalize(cwd)?);
    }

    anyhow::bail!("cannot determine dotconfigs root. Use --root or set DOTCONFIGS_ROOT env var");
}

/// The user's home directory.
///
/// # Errors
///
/// Returns [`ProjectError::HomeUnavailable`] if neither `HOME` nor
/// `USERPROFILE` is set.
pub fn home_dir() -> Result<PathBuf, ProjectError> {
    let vars: &[&str] = if cfg!(target_os = "windows") {
        &["USERPROFILE", "HOME"]
    } else {
        &["HOME"]
    };
    vars.iter()
        .find_map(|v| std::env::var_os(v).filter(|s| !s.is_empty()))
        .map(PathBuf::from)
        .ok_or(ProjectError::HomeUnavailable)
}

/// Canonical project directory: `dir`, or the current directory.
///
/// # Errors
///
/// Returns an error if the directory does not exist.
pub fn resolve_project_dir(dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().context("reading current directory")?,
    };
    dunce::canonicalize(&dir).with_context(|| format!("resolving {}", dir.display()))
}

/// Open the git repository rooted at `dir`.
///
/// # Errors
///
/// Returns [`ProjectError::NotGitRepository`] if `dir` is not a repository root.
pub fn require_git_repo(dir: &Path) -> Result<git2::Repository, ProjectError> {
    git2::Repository::open(dir).map_err(|_| ProjectError::NotGitRepository {
        path: dir.to_path_buf(),
    })
}

/// Write a scaffolded configuration unless one already exists.
///
/// Returns whether the file was written.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_scaffold(
    path: &Path,
    config: &DeployConfig,
    force: bool,
    log: &Logger,
) -> Result<bool> {
    if path.exists() && !force {
        log.info(&format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
        return Ok(false);
    }
    if config.is_empty() {
        log.warn("No plugin manifests declare modules for this scope");
    }
    config::save(path, config)?;
    log.info(&format!(
        "Wrote {} ({} plugins, {} modules)",
        path.display(),
        config.plugins.len(),
        config.module_count()
    ));
    Ok(true)
}
