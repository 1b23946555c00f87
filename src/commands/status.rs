//! Read-only comparison of the filesystem against a configuration.
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{global_config_path, home_dir, project_config_path, resolve_project_dir, resolve_root};
use crate::cli::{GlobalOpts, StatusOpts};
use crate::config::{self, DeployConfig, Method};
use crate::engine::materialize::file_names;
use crate::engine::{
    Ownership, Placement, TargetBase, classify, deployed_names, parse_modules,
    resolves_into_repository,
};
use crate::error::ProjectError;
use crate::logging::Logger;
use crate::resources::helpers::fs::entry_names;
use crate::resources::{self, ResourceState};

/// State of one deployed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    /// Matches its source.
    Ok,
    /// Would be created by a deploy.
    Missing,
    /// Would be replaced or removed by a deploy.
    Drifted(String),
    /// Cannot be deployed without manual intervention.
    Blocked(String),
    /// The source file does not exist.
    SourceMissing,
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => f.write_str("ok"),
            Self::Missing => f.write_str("missing"),
            Self::Drifted(detail) => write!(f, "drifted ({detail})"),
            Self::Blocked(reason) => write!(f, "blocked ({reason})"),
            Self::SourceMissing => f.write_str("source missing"),
        }
    }
}

/// One reported entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// `plugin/module` the entry belongs to.
    pub module: String,
    /// Resolved target path.
    pub target: PathBuf,
    /// What a deploy would find there.
    pub status: EntryStatus,
}

/// Inspect every entry of `config` without changing anything.
///
/// # Errors
///
/// Returns an error if a target exists but cannot be inspected or a source
/// directory cannot be listed.
pub fn collect(
    config: &DeployConfig,
    repo_root: &Path,
    base: &TargetBase,
) -> Result<Vec<StatusEntry>> {
    let mut entries = Vec::new();
    let instructions = parse_modules(config, None);
    let placements: Vec<Placement> = instructions
        .iter()
        .map(|i| Placement::new(i, repo_root, base))
        .collect();
    let keep = deployed_names(&instructions, &placements)?;

    for (instruction, placement) in instructions.iter().zip(&placements) {
        let module = instruction.label();
        let Placement { source, target, .. } = placement;

        if !source.is_dir() {
            entries.push(StatusEntry {
                module,
                status: entry_status(instruction.method, source, target)?,
                target: target.clone(),
            });
            continue;
        }

        for name in file_names(source, &instruction.files)? {
            let file_target = target.join(&name);
            entries.push(StatusEntry {
                module: module.clone(),
                status: entry_status(instruction.method, &source.join(&name), &file_target)?,
                target: file_target,
            });
        }

        let Some(names) = placement.directory.as_ref().and_then(|d| keep.get(d)) else {
            continue;
        };
        if !target.is_dir() || resolves_into_repository(target, repo_root) {
            continue;
        }
        for name in entry_names(target)? {
            if names.contains(&name) {
                continue;
            }
            let path = target.join(&name);
            let detail = match classify(&path, repo_root) {
                Ownership::Foreign => continue,
                Ownership::Owned => "stale symlink",
                Ownership::Broken => "broken symlink",
            };
            entries.push(StatusEntry {
                module: module.clone(),
                target: path,
                status: EntryStatus::Drifted(detail.to_string()),
            });
        }
    }

    Ok(entries)
}

fn entry_status(method: Method, source: &Path, target: &Path) -> Result<EntryStatus> {
    if !source.exists() {
        return Ok(EntryStatus::SourceMissing);
    }
    let resource = resources::for_method(method, source.to_path_buf(), target.to_path_buf());
    Ok(match resource.current_state()? {
        ResourceState::Correct => EntryStatus::Ok,
        ResourceState::Missing => EntryStatus::Missing,
        ResourceState::Incorrect { current } => EntryStatus::Drifted(current),
        ResourceState::Invalid { reason } => EntryStatus::Blocked(reason),
    })
}

/// Render entries as report lines, with targets shown relative to `base`.
#[must_use]
pub fn render(entries: &[StatusEntry], base: &Path) -> Vec<String> {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    let (mut ok, mut missing, mut drifted, mut blocked, mut source_missing) = (0, 0, 0, 0, 0);

    for entry in entries {
        let shown = entry.target.strip_prefix(base).unwrap_or(&entry.target);
        lines.push(format!(
            "{:<16} {:<16} {}",
            entry.module,
            entry.status.to_string(),
            shown.display()
        ));
        match entry.status {
            EntryStatus::Ok => ok += 1,
            EntryStatus::Missing => missing += 1,
            EntryStatus::Drifted(_) => drifted += 1,
            EntryStatus::Blocked(_) => blocked += 1,
            EntryStatus::SourceMissing => source_missing += 1,
        }
    }

    lines.push(format!(
        "{ok} ok, {missing} missing, {drifted} drifted, {blocked} blocked, {source_missing} source missing"
    ));
    lines
}

/// Run the `status` command.
///
/// # Errors
///
/// Returns an error if the configuration is missing or invalid, or an entry
/// cannot be inspected.
pub fn run(global: &GlobalOpts, opts: &StatusOpts, log: &Logger) -> Result<()> {
    let root = resolve_root(global)?;

    let (config_path, base) = if let Some(dir) = opts.dir.as_deref() {
        let project = resolve_project_dir(Some(dir))?;
        let path = project_config_path(&project);
        if !path.exists() {
            return Err(ProjectError::ProjectConfigMissing { path }.into());
        }
        (path, TargetBase::Project(project))
    } else {
        let path = global_config_path(&root);
        if !path.exists() {
            return Err(ProjectError::GlobalConfigMissing { path }.into());
        }
        (path, TargetBase::Home(home_dir()?))
    };

    log.stage(&format!("Status of {}", config_path.display()));
    let config = config::load(&config_path)?;
    let entries = collect(&config, &root, &base)?;
    for line in render(&entries, base.base()) {
        log.info(&line);
    }
    Ok(())
}
