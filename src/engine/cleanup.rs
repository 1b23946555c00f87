//! Convergent cleanup of stale and broken symlinks in target directories.
//!
//! Ownership is decided per directory: a symlink into the repository is only
//! stale when no module of the document deploys its name into that directory.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::materialize::file_names;
use super::{Context, DeployStats, Instruction, Outcome, TargetBase};
use crate::error::DeployError;
use crate::resources::helpers::fs::{entry_names, is_symlink};

/// Who an entry in a target directory belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// A symlink resolving inside the repository.
    Owned,
    /// A symlink whose target does not resolve.
    Broken,
    /// Anything else: regular files, directories, links resolving elsewhere.
    Foreign,
}

/// Classify the entry at `path`. `repo_root` must be canonical.
#[must_use]
pub fn classify(path: &Path, repo_root: &Path) -> Ownership {
    if !is_symlink(path) {
        return Ownership::Foreign;
    }
    match dunce::canonicalize(path) {
        Err(_) => Ownership::Broken,
        Ok(resolved) if resolved.starts_with(repo_root) => Ownership::Owned,
        Ok(_) => Ownership::Foreign,
    }
}

/// Where a module lands, resolved before a run changes anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Source path under the repository root.
    pub source: PathBuf,
    /// Resolved target path.
    pub target: PathBuf,
    /// Directory the module deploys into, keyed as in [`deployed_names`].
    pub directory: Option<PathBuf>,
}

impl Placement {
    /// Resolve `instruction` against the repository and the target base.
    ///
    /// A directory module deploys into its target; a single-file module
    /// deploys into its target's parent.
    #[must_use]
    pub fn new(instruction: &Instruction, repo_root: &Path, base: &TargetBase) -> Self {
        let source = repo_root.join(&instruction.source);
        let target = base.resolve(&instruction.target);
        let directory = if source.is_dir() {
            Some(directory_key(&target))
        } else {
            target.parent().map(directory_key)
        };
        Self {
            source,
            target,
            directory,
        }
    }
}

/// Canonical form of `dir`, or its lexical form while it does not exist.
fn directory_key(dir: &Path) -> PathBuf {
    dunce::canonicalize(dir).unwrap_or_else(|_| dir.components().collect())
}

/// Names deployed into each target directory, across all `instructions`.
///
/// `placements` must be the placements of `instructions`, in order. Modules
/// whose source is missing contribute nothing.
///
/// # Errors
///
/// Returns an error if a source directory deploying all its files cannot be
/// listed.
pub fn deployed_names(
    instructions: &[Instruction],
    placements: &[Placement],
) -> anyhow::Result<HashMap<PathBuf, Vec<String>>> {
    let mut names: HashMap<PathBuf, Vec<String>> = HashMap::new();
    for (instruction, placement) in instructions.iter().zip(placements) {
        let Some(directory) = &placement.directory else {
            continue;
        };
        let entry = names.entry(directory.clone()).or_default();
        if placement.source.is_dir() {
            entry.extend(file_names(&placement.source, &instruction.files)?);
        } else if placement.source.exists()
            && let Some(name) = placement.target.file_name()
        {
            entry.push(name.to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Whether `dir` resolves to a path inside `repo_root` (canonical).
#[must_use]
pub fn resolves_into_repository(dir: &Path, repo_root: &Path) -> bool {
    dunce::canonicalize(dir).is_ok_and(|resolved| resolved.starts_with(repo_root))
}

/// Remove owned and broken symlinks in `target_dir` whose names are not in
/// `keep`.
///
/// Entries are visited in name order. Foreign entries are never touched.
/// Does nothing when `target_dir` is not a directory, or when it resolves
/// inside the repository (a target directory linked to its source).
///
/// # Errors
///
/// Returns [`DeployError::Filesystem`] if the directory cannot be listed or
/// an entry cannot be removed.
pub fn cleanup_directory(
    ctx: &Context<'_>,
    target_dir: &Path,
    keep: &[String],
) -> Result<DeployStats, DeployError> {
    let mut stats = DeployStats::new();
    if !target_dir.is_dir() {
        return Ok(stats);
    }
    if resolves_into_repository(target_dir, &ctx.repo_root) {
        ctx.log.debug(&format!(
            "{} resolves into the repository, not cleaning up",
            target_dir.display()
        ));
        return Ok(stats);
    }

    for name in entry_names(target_dir)? {
        if keep.contains(&name) {
            continue;
        }
        let path = target_dir.join(&name);
        let kind = match classify(&path, &ctx.repo_root) {
            Ownership::Foreign => continue,
            Ownership::Owned => "stale symlink",
            Ownership::Broken => "broken symlink",
        };

        if ctx.dry_run() {
            ctx.log
                .dry_run(&format!("Would remove {kind} {}", path.display()));
        } else {
            ctx.log.info(&format!("Removed {kind} {}", path.display()));
        }
        ctx.fs_ops.remove(&path)?;
        stats.record(Outcome::Removed);
    }

    Ok(stats)
}
