//! File-system inspection helpers shared by resources, cleanup, and status.
use anyhow::{Context as _, Result};
use std::io::Read as _;
use std::path::{Path, PathBuf};

/// Whether anything (including a broken symlink) exists at `path`.
#[must_use]
pub fn entry_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Whether `path` is a symlink, regardless of where it points.
#[must_use]
pub fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|m| m.is_symlink())
}

/// Whether `path` is a directory that is not itself a symlink.
#[must_use]
pub fn is_real_dir(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|m| m.is_dir())
}

/// Whether `a` and `b` resolve to the same filesystem object.
///
/// Both paths are fully canonicalized, so chains of symlinks and symlinked
/// parent directories compare equal to the file they end at. Returns `false`
/// if either side does not resolve.
#[must_use]
pub fn resolves_to(a: &Path, b: &Path) -> bool {
    match (dunce::canonicalize(a), dunce::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Absolute form of `source` to use as symlink text.
///
/// # Errors
///
/// Returns an error if the current directory is needed and unavailable.
pub fn link_text(source: &Path) -> Result<PathBuf> {
    std::path::absolute(source).with_context(|| format!("resolving {}", source.display()))
}

/// Whether two regular files have identical bytes.
///
/// # Errors
///
/// Returns an error if either file cannot be read.
pub fn same_contents(a: &Path, b: &Path) -> Result<bool> {
    let meta_a = std::fs::metadata(a).with_context(|| format!("reading {}", a.display()))?;
    let meta_b = std::fs::metadata(b).with_context(|| format!("reading {}", b.display()))?;
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }

    let mut file_a = std::fs::File::open(a).with_context(|| format!("opening {}", a.display()))?;
    let mut file_b = std::fs::File::open(b).with_context(|| format!("opening {}", b.display()))?;
    let mut buf_a = [0u8; 8192];
    let mut buf_b = [0u8; 8192];
    loop {
        let n = file_a
            .read(&mut buf_a)
            .with_context(|| format!("reading {}", a.display()))?;
        let (Some(chunk_a), Some(chunk_b)) = (buf_a.get(..n), buf_b.get_mut(..n)) else {
            return Ok(false);
        };
        if chunk_a.is_empty() {
            return Ok(true);
        }
        file_b
            .read_exact(chunk_b)
            .with_context(|| format!("reading {}", b.display()))?;
        if chunk_a != chunk_b {
            return Ok(false);
        }
    }
}

/// Names of the regular files directly inside `dir`, sorted.
///
/// Symlinks to files count as files. Subdirectories are ignored.
///
/// # Errors
///
/// Returns an error if `dir` cannot be listed.
pub fn regular_files(dir: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}

/// Names of every entry directly inside `dir`, sorted.
///
/// # Errors
///
/// Returns an error if `dir` cannot be listed.
pub fn entry_names(dir: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}
