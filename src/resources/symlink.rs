//! Symlink resource.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::helpers::fs::{entry_exists, is_real_dir, is_symlink, link_text, resolves_to};
use super::{Resource, ResourceState, ensure_parent};
use crate::operations::FileSystemOps;

/// A symlink at `target` pointing at `source`.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// The source file (what the symlink points to).
    pub source: PathBuf,
    /// Where the symlink lives.
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Resource for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        if !entry_exists(&self.target) {
            return Ok(ResourceState::Missing);
        }

        if is_real_dir(&self.target) {
            return Ok(ResourceState::Invalid {
                reason: "target is a directory".to_string(),
            });
        }

        // Whatever sits at the target is correct when it ends at the source,
        // including links reached through a symlinked parent directory.
        if resolves_to(&self.target, &self.source) {
            return Ok(ResourceState::Correct);
        }

        if is_symlink(&self.target) {
            let existing = std::fs::read_link(&self.target)
                .with_context(|| format!("reading link {}", self.target.display()))?;
            let broken = if self.target.exists() { "" } else { " (broken)" };
            return Ok(ResourceState::Incorrect {
                current: format!("points to {}{broken}", existing.display()),
            });
        }

        Ok(ResourceState::Incorrect {
            current: "target is a regular file".to_string(),
        })
    }

    fn apply(&self, fs: &dyn FileSystemOps) -> Result<()> {
        ensure_parent(fs, &self.target)?;
        if entry_exists(&self.target) {
            fs.remove(&self.target)?;
        }
        fs.symlink(&link_text(&self.source)?, &self.target)
    }
}
