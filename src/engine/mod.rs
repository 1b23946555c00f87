//! The deployment engine: parse modules, materialize entries, clean up.
pub mod cleanup;
pub mod driver;
pub mod materialize;
pub mod parser;

use std::path::{Path, PathBuf};

use crate::logging::Log;
use crate::operations::FileSystemOps;

pub use cleanup::{
    Ownership, Placement, classify, cleanup_directory, deployed_names, resolves_into_repository,
};
pub use driver::{DeployOptions, deploy};
pub use materialize::materialize_module;
pub use parser::{Instruction, parse_modules};

/// Shared context for one deploy run.
pub struct Context<'a> {
    /// Canonical repository root; symlinks resolving under it are owned.
    pub repo_root: PathBuf,
    /// Logger for progress and diagnostics.
    pub log: &'a dyn Log,
    /// Every filesystem mutation goes through here.
    pub fs_ops: &'a dyn FileSystemOps,
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("repo_root", &self.repo_root)
            .field("log", &"<dyn Log>")
            .field("fs_ops", &self.fs_ops)
            .finish()
    }
}

impl<'a> Context<'a> {
    /// Create a context. `repo_root` should already be canonical.
    #[must_use]
    pub const fn new(repo_root: PathBuf, log: &'a dyn Log, fs_ops: &'a dyn FileSystemOps) -> Self {
        Self {
            repo_root,
            log,
            fs_ops,
        }
    }

    /// Whether mutations are suppressed for this run.
    #[must_use]
    pub fn dry_run(&self) -> bool {
        self.fs_ops.is_dry_run()
    }
}

/// What happened to one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Target was absent and has been created.
    Created,
    /// Target existed with the wrong content or kind and has been replaced.
    Updated,
    /// Target already matched.
    Unchanged,
    /// Entry could not be deployed (missing source, protected directory).
    Skipped,
    /// Stale or broken symlink removed during cleanup.
    Removed,
}

/// Counters accumulated across a deploy run.
///
/// # Examples
///
/// ```
/// use dotconfigs::engine::{DeployStats, Outcome};
///
/// let mut stats = DeployStats::new();
/// stats.record(Outcome::Created);
/// stats += DeployStats { unchanged: 3, ..DeployStats::default() };
/// assert_eq!(stats.created, 1);
/// assert_eq!(stats.unchanged, 3);
/// assert_eq!(stats.summary_lines()[0], "Created:   1");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeployStats {
    /// Entries created.
    pub created: u32,
    /// Entries replaced.
    pub updated: u32,
    /// Entries already correct.
    pub unchanged: u32,
    /// Entries skipped with a warning.
    pub skipped: u32,
    /// Stale or broken symlinks removed.
    pub removed: u32,
}

impl DeployStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one outcome.
    pub const fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Removed => self.removed += 1,
        }
    }

    /// Number of entries that were (or in dry-run would be) changed on disk.
    #[must_use]
    pub const fn changes(&self) -> u32 {
        self.created + self.updated + self.removed
    }

    /// The five summary lines, labels padded to a common width.
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        [
            ("Created:", self.created),
            ("Updated:", self.updated),
            ("Unchanged:", self.unchanged),
            ("Skipped:", self.skipped),
            ("Removed:", self.removed),
        ]
        .into_iter()
        .map(|(label, n)| format!("{label:<11}{n}"))
        .collect()
    }
}

impl std::ops::AddAssign for DeployStats {
    fn add_assign(&mut self, rhs: Self) {
        self.created += rhs.created;
        self.updated += rhs.updated;
        self.unchanged += rhs.unchanged;
        self.skipped += rhs.skipped;
        self.removed += rhs.removed;
    }
}

/// The directory relative targets are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetBase {
    /// Global scope: `~`, `$HOME`, and relative targets resolve under home.
    Home(PathBuf),
    /// Project scope: relative targets resolve under the project root.
    Project(PathBuf),
}

impl TargetBase {
    /// Resolve a configured target string to a concrete path.
    ///
    /// Absolute targets are returned as is in either scope.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use dotconfigs::engine::TargetBase;
    ///
    /// let home = TargetBase::Home(PathBuf::from("/home/u"));
    /// assert_eq!(home.resolve("~/.claude/hooks"), PathBuf::from("/home/u/.claude/hooks"));
    /// assert_eq!(home.resolve("$HOME/.gitconfig"), PathBuf::from("/home/u/.gitconfig"));
    /// assert_eq!(home.resolve(".bashrc"), PathBuf::from("/home/u/.bashrc"));
    ///
    /// let project = TargetBase::Project(PathBuf::from("/work/app"));
    /// assert_eq!(project.resolve(".git/hooks"), PathBuf::from("/work/app/.git/hooks"));
    /// ```
    #[must_use]
    pub fn resolve(&self, target: &str) -> PathBuf {
        match self {
            Self::Home(home) => {
                for placeholder in ["~", "$HOME", "${HOME}"] {
                    if target == placeholder {
                        return home.clone();
                    }
                    if let Some(rest) = target.strip_prefix(placeholder)
                        && let Some(rest) = rest.strip_prefix(['/', '\\'])
                    {
                        return home.join(rest);
                    }
                }
                join_unless_absolute(home, target)
            }
            Self::Project(root) => join_unless_absolute(root, target),
        }
    }

    /// The base directory itself.
    #[must_use]
    pub fn base(&self) -> &Path {
        match self {
            Self::Home(p) | Self::Project(p) => p,
        }
    }
}

fn join_unless_absolute(base: &Path, target: &str) -> PathBuf {
    let target = Path::new(target);
    if target.is_absolute() {
        target.to_path_buf()
    } else {
        base.join(target)
    }
}
