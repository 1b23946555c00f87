//! Run every module of a configuration document.
use std::path::Path;

use anyhow::Context as _;

use super::cleanup::{Placement, cleanup_directory, deployed_names};
use super::materialize::materialize_module;
use super::parser::{Instruction, parse_modules};
use super::{Context, DeployStats, TargetBase};
use crate::config::{self, validation};
use crate::error::DeployError;
use crate::logging::Log;
use crate::operations;

/// Options for one deploy run.
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Restrict the run to one plugin.
    pub group: Option<String>,
    /// Report intended actions without changing the filesystem.
    pub dry_run: bool,
    /// Log the counter summary at the end.
    pub show_summary: bool,
    /// Where relative targets resolve.
    pub target_base: TargetBase,
}

impl DeployOptions {
    /// Options for a full, real run with a summary.
    #[must_use]
    pub const fn new(target_base: TargetBase) -> Self {
        Self {
            group: None,
            dry_run: false,
            show_summary: true,
            target_base,
        }
    }
}

/// Deploy every module of the document at `config_path`.
///
/// Modules run in document order; each is materialized, then its target
/// directory is cleaned up. Cleanup keeps every name any module of the
/// document deploys into that directory, including modules outside the
/// selected group. Skipped entries do not fail the run.
///
/// # Errors
///
/// - [`DeployError::ConfigMissing`] / [`DeployError::ConfigInvalid`] if the
///   document cannot be used.
/// - [`DeployError::Filesystem`] if a mutation fails; modules already
///   processed keep their state.
pub fn deploy(
    config_path: &Path,
    repo_root: &Path,
    options: &DeployOptions,
    log: &dyn Log,
) -> Result<DeployStats, DeployError> {
    let config = config::load(config_path)?;
    let repo_root = dunce::canonicalize(repo_root)
        .with_context(|| format!("resolving repository root {}", repo_root.display()))?;

    if options.dry_run {
        log.info("Dry-run mode: no changes will be made");
    }

    for warning in validation::validate_all(&config, &repo_root) {
        log.warn(&warning.to_string());
    }

    let fs_ops = operations::for_mode(options.dry_run);
    let ctx = Context::new(repo_root, log, fs_ops.as_ref());

    let instructions = parse_modules(&config, None);
    let placements: Vec<Placement> = instructions
        .iter()
        .map(|i| Placement::new(i, &ctx.repo_root, &options.target_base))
        .collect();
    let keep = deployed_names(&instructions, &placements)?;

    let group = options.group.as_deref().filter(|g| !g.is_empty());
    let selected: Vec<(&Instruction, &Placement)> = instructions
        .iter()
        .zip(&placements)
        .filter(|(i, _)| group.is_none_or(|g| g == i.plugin))
        .collect();
    if let Some(group) = group
        && selected.is_empty()
    {
        log.warn(&format!("No modules in group '{group}'"));
    }

    let mut stats = DeployStats::new();
    for (instruction, placement) in selected {
        log.stage(&instruction.label());
        log.debug(&format!(
            "{} -> {} ({}, files: {})",
            instruction.source, instruction.target, instruction.method, instruction.files
        ));

        stats += materialize_module(
            &ctx,
            &placement.source,
            &placement.target,
            &instruction.files,
            instruction.method,
        )?;

        if placement.source.is_dir()
            && let Some(names) = placement.directory.as_ref().and_then(|d| keep.get(d))
        {
            stats += cleanup_directory(&ctx, &placement.target, names)?;
        }
    }

    if options.show_summary {
        log.stage("Summary");
        for line in stats.summary_lines() {
            log.info(&line);
        }
    }

    Ok(stats)
}
