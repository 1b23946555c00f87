//! Idempotent deployed-entry primitives (check + apply pattern).
pub mod copy;
pub mod helpers;
pub mod symlink;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::Method;
use crate::operations::FileSystemOps;

pub use copy::CopyResource;
pub use symlink::SymlinkResource;

/// State of a deployed entry relative to its source.
///
/// # Examples
///
/// ```
/// use dotconfigs::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// let wrong = ResourceState::Incorrect { current: "points to /other/path".into() };
/// let skip = ResourceState::Invalid { reason: "target is a directory".into() };
///
/// assert_ne!(missing, correct);
/// assert_eq!(correct, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing exists at the target path.
    Missing,
    /// The target already reflects the source.
    Correct,
    /// Something exists at the target but does not reflect the source.
    Incorrect {
        /// What is currently there.
        current: String,
    },
    /// The target cannot be replaced (e.g. it is a real directory).
    Invalid {
        /// Why the entry is left alone.
        reason: String,
    },
}

/// An entry that can be checked against its source and brought in line.
pub trait Resource: std::fmt::Debug {
    /// Human-readable description of this entry.
    fn description(&self) -> String;

    /// Inspect the target without changing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the target exists but cannot be inspected.
    fn current_state(&self) -> Result<ResourceState>;

    /// Replace whatever is at the target with the desired entry.
    ///
    /// Parent directories are created as needed. All mutations go through
    /// `fs`, so a dry-run implementation leaves the disk untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if a filesystem mutation fails.
    fn apply(&self, fs: &dyn FileSystemOps) -> Result<()>;
}

/// Build the resource for `method` mapping `source` onto `target`.
#[must_use]
pub fn for_method(method: Method, source: PathBuf, target: PathBuf) -> Box<dyn Resource> {
    match method {
        Method::Symlink => Box::new(SymlinkResource::new(source, target)),
        Method::Copy => Box::new(CopyResource::new(source, target)),
    }
}

/// Ensure the parent of `path` exists, creating it through `fs` if not.
pub(crate) fn ensure_parent(fs: &dyn FileSystemOps, path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs.create_dir_all(parent)
        }
        _ => Ok(()),
    }
}
