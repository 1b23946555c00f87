//! Copied-file resource.
use anyhow::Result;
use std::path::PathBuf;

use super::helpers::fs::{entry_exists, is_real_dir, is_symlink, same_contents};
use super::{Resource, ResourceState, ensure_parent};
use crate::operations::FileSystemOps;

/// A regular file at `target` whose bytes equal `source`.
#[derive(Debug, Clone)]
pub struct CopyResource {
    /// The file to copy from.
    pub source: PathBuf,
    /// Where the copy lives.
    pub target: PathBuf,
}

impl CopyResource {
    /// Create a new copy resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Resource for CopyResource {
    fn description(&self) -> String {
        format!(
            "{} (copy of {})",
            self.target.display(),
            self.source.display()
        )
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
        if is_symlink(&self.target) {
            return Ok(ResourceState::Incorrect {
                current: "target is a symlink".to_string(),
            });
        }
        if same_contents(&self.source, &self.target)? {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            })
        }
    }

    fn apply(&self, fs: &dyn FileSystemOps) -> Result<()> {
        ensure_parent(fs, &self.target)?;
        // A symlink at the target would make the copy write through it.
        if entry_exists(&self.target) {
            fs.remove(&self.target)?;
        }
        fs.copy_file(&self.source, &self.target)
    }
}
