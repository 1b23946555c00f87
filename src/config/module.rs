//! Typed module records as they appear in configuration documents.
use std::path::{Component, Path};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::effective::EffectiveSet;

/// How each file of a module is materialized at its target.
///
/// # Examples
///
/// ```
/// use dotconfigs::config::Method;
///
/// let m: Method = serde_json::from_str("\"copy\"").unwrap();
/// assert_eq!(m, Method::Copy);
/// assert_eq!(Method::Symlink.to_string(), "symlink");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Target is a symbolic link to the source file.
    Symlink,
    /// Target is a byte-identical copy of the source file.
    Copy,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Symlink => f.write_str("symlink"),
            Self::Copy => f.write_str("copy"),
        }
    }
}

/// One deployment unit: a source inside the repository mapped onto a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSpec {
    /// Path relative to the repository root; a file or a directory.
    pub source: String,
    /// Destination path (home-relative or project-relative, see `TargetBase`).
    pub target: String,
    /// Materialization method, shared by every file of the module.
    pub method: Method,
    /// Filenames inside `source` to deploy; absent or empty means all files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    /// Filenames to subtract from `include`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
    /// Keys the engine does not interpret, kept so documents round-trip.
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl ModuleSpec {
    /// Resolve this module's include/exclude lists into an [`EffectiveSet`].
    #[must_use]
    pub fn effective_set(&self) -> EffectiveSet {
        EffectiveSet::resolve(
            self.include.as_deref().unwrap_or_default(),
            self.exclude.as_deref().unwrap_or_default(),
        )
    }

    /// Check the fields serde cannot: non-empty source and target, and
    /// include entries that name files directly inside `source`.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated constraint.
    pub fn check(&self) -> Result<(), String> {
        if self.source.trim().is_empty() {
            return Err("`source` must not be empty".to_string());
        }
        if self.target.trim().is_empty() {
            return Err("`target` must not be empty".to_string());
        }
        if let Some(name) = self
            .include
            .iter()
            .flatten()
            .find(|name| !is_plain_filename(name))
        {
            return Err(format!("include entry '{name}' is not a plain filename"));
        }
        Ok(())
    }
}

/// Whether `name` is a single normal path component (no separators, `.` or `..`).
pub(super) fn is_plain_filename(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
