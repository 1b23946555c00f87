//! Filesystem mutation abstractions.
//!
//! Every call that changes the filesystem during a deploy goes through
//! [`FileSystemOps`]. Real runs use [`SystemFileSystemOps`]; dry runs use
//! [`DryRunFileSystemOps`], whose mutations are no-ops, so the decision logic
//! is shared while the side effects are not.

use anyhow::{Context as _, Result};
use std::path::Path;

/// Abstraction over the mutating filesystem calls used by the engine.
///
/// Queries (metadata, canonicalize, reading) stay direct `std::fs` calls;
/// only mutations are routed through this trait.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Create `path` and all missing parents.
    ///
    /// # Errors
    ///
    /// Returns an error if a component cannot be created.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Create a symbolic link at `link` whose link text is `original`.
    ///
    /// # Errors
    ///
    /// Returns an error if `link` already exists or cannot be created.
    fn symlink(&self, original: &Path, link: &Path) -> Result<()>;

    /// Copy `from` to `to`, preserving permission bits.
    ///
    /// # Errors
    ///
    /// Returns an error if either path is unusable.
    fn copy_file(&self, from: &Path, to: &Path) -> Result<()>;

    /// Remove the file, symlink, or empty directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove(&self, path: &Path) -> Result<()>;

    /// Whether mutations are suppressed.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("creating directory {}", path.display()))
    }

    fn symlink(&self, original: &Path, link: &Path) -> Result<()> {
        #[cfg(unix)]
        let result = std::os::unix::fs::symlink(original, link);
        #[cfg(windows)]
        let result = if original.is_dir() {
            std::os::windows::fs::symlink_dir(original, link)
        } else {
            std::os::windows::fs::symlink_file(original, link)
        };
        result.with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                original.display()
            )
        })
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        std::fs::copy(from, to)
            .map(|_| ())
            .with_context(|| format!("copying {} to {}", from.display(), to.display()))
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let meta = std::fs::symlink_metadata(path)
            .with_context(|| format!("reading metadata for {}", path.display()))?;
        if meta.is_dir() {
            std::fs::remove_dir(path)
        } else {
            std::fs::remove_file(path)
        }
        .with_context(|| format!("removing {}", path.display()))
    }
}

/// [`FileSystemOps`] for dry runs: every mutation succeeds without effect.
#[derive(Debug, Default)]
pub struct DryRunFileSystemOps;

impl FileSystemOps for DryRunFileSystemOps {
    fn create_dir_all(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn symlink(&self, _original: &Path, _link: &Path) -> Result<()> {
        Ok(())
    }

    fn copy_file(&self, _from: &Path, _to: &Path) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

/// Select the implementation for a run.
#[must_use]
pub fn for_mode(dry_run: bool) -> Box<dyn FileSystemOps> {
    if dry_run {
        Box::new(DryRunFileSystemOps)
    } else {
        Box::new(SystemFileSystemOps)
    }
}

/// Mock [`FileSystemOps`] for unit tests that records every call instead of
/// touching the disk.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingFileSystemOps {
    calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingFileSystemOps {
    /// Create a mock with no recorded calls.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded calls in order, e.g. `"symlink /a -> /b"`.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: String) {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(call);
    }
}

#[cfg(test)]
impl FileSystemOps for RecordingFileSystemOps {
    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.record(format!("mkdir {}", path.display()));
        Ok(())
    }

    fn symlink(&self, original: &Path, link: &Path) -> Result<()> {
        self.record(format!("symlink {} -> {}", link.display(), original.display()));
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        self.record(format!("copy {} -> {}", from.display(), to.display()));
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.record(format!("remove {}", path.display()));
        Ok(())
    }
}
