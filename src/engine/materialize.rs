//! Bring target entries in line with their sources.
use std::path::Path;

use super::{Context, DeployStats, Outcome};
use crate::config::{EffectiveSet, Method};
use crate::error::DeployError;
use crate::resources::helpers::fs::{entry_exists, is_real_dir, regular_files};
use crate::resources::{self, ResourceState};

/// Deploy one module.
///
/// A directory `source` deploys each file of `files` into the directory
/// `target`; a file `source` deploys itself onto `target`. Missing sources
/// and protected directories are warned about and counted as skipped.
///
/// # Errors
///
/// Returns [`DeployError::Filesystem`] if a target cannot be inspected,
/// created, or replaced.
pub fn materialize_module(
    ctx: &Context<'_>,
    source: &Path,
    target: &Path,
    files: &EffectiveSet,
    method: Method,
) -> Result<DeployStats, DeployError> {
    let mut stats = DeployStats::new();

    if source.is_dir() {
        prepare_target_dir(ctx, target)?;
        for name in file_names(source, files)? {
            stats.record(materialize_entry(
                ctx,
                &source.join(&name),
                &target.join(&name),
                method,
            )?);
        }
    } else if source.exists() {
        stats.record(materialize_entry(ctx, source, target, method)?);
    } else {
        ctx.log.warn(
            &DeployError::SourceMissing {
                path: source.to_path_buf(),
            }
            .to_string(),
        );
        stats.record(Outcome::Skipped);
    }

    Ok(stats)
}

/// The filenames a directory module deploys.
///
/// # Errors
///
/// Returns an error if `files` is [`EffectiveSet::AllFiles`] and the source
/// directory cannot be listed.
pub fn file_names(source: &Path, files: &EffectiveSet) -> anyhow::Result<Vec<String>> {
    Ok(match files {
        EffectiveSet::AllFiles => regular_files(source)?,
        EffectiveSet::Explicit(names) => names.clone(),
        EffectiveSet::NoneSelected => Vec::new(),
    })
}

/// Make sure `target` can hold entries.
///
/// A symlink to a directory is used as is; anything else that is not a
/// directory is replaced by one.
fn prepare_target_dir(ctx: &Context<'_>, target: &Path) -> Result<(), DeployError> {
    if target.is_dir() {
        if !is_real_dir(target) {
            ctx.log
                .debug(&format!("{} is a symlinked directory", target.display()));
        }
        return Ok(());
    }

    if entry_exists(target) {
        let conflict = DeployError::PathConflict {
            path: target.to_path_buf(),
            reason: "expected a directory, replacing".to_string(),
        };
        ctx.log.warn(&conflict.to_string());
        ctx.fs_ops.remove(target)?;
    }
    if ctx.dry_run() {
        ctx.log
            .dry_run(&format!("Would create directory {}", target.display()));
    }
    ctx.fs_ops.create_dir_all(target)?;
    Ok(())
}

fn materialize_entry(
    ctx: &Context<'_>,
    source: &Path,
    target: &Path,
    method: Method,
) -> Result<Outcome, DeployError> {
    if !source.exists() {
        ctx.log.warn(
            &DeployError::SourceMissing {
                path: source.to_path_buf(),
            }
            .to_string(),
        );
        return Ok(Outcome::Skipped);
    }
    if method == Method::Copy && source.is_dir() {
        ctx.log.warn(&format!(
            "Cannot copy a directory, skipping: {}",
            source.display()
        ));
        return Ok(Outcome::Skipped);
    }

    let resource = resources::for_method(method, source.to_path_buf(), target.to_path_buf());
    match resource.current_state()? {
        ResourceState::Correct => {
            ctx.log.debug(&format!("ok: {}", resource.description()));
            Ok(Outcome::Unchanged)
        }
        ResourceState::Missing => {
            if ctx.dry_run() {
                ctx.log.dry_run(&match method {
                    Method::Symlink => format!(
                        "Would link {} -> {}",
                        target.display(),
                        source.display()
                    ),
                    Method::Copy => format!(
                        "Would copy {} -> {}",
                        source.display(),
                        target.display()
                    ),
                });
            } else {
                ctx.log.info(&match method {
                    Method::Symlink => format!("Linked {}", target.display()),
                    Method::Copy => format!("Copied {}", target.display()),
                });
            }
            resource.apply(ctx.fs_ops)?;
            Ok(Outcome::Created)
        }
        ResourceState::Incorrect { current } => {
            if ctx.dry_run() {
                ctx.log
                    .dry_run(&format!("Would update {} ({current})", target.display()));
            } else {
                ctx.log
                    .info(&format!("Updated {} ({current})", target.display()));
            }
            resource.apply(ctx.fs_ops)?;
            Ok(Outcome::Updated)
        }
        ResourceState::Invalid { reason } => {
            ctx.log.warn(
                &DeployError::PathConflict {
                    path: target.to_path_buf(),
                    reason: format!("{reason}, skipping"),
                }
                .to_string(),
            );
            Ok(Outcome::Skipped)
        }
    }
}
