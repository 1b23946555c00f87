//! Include/exclude resolution.
use std::collections::HashSet;

/// Legacy rendering of [`EffectiveSet::NoneSelected`].
pub const NONE_SENTINEL: &str = "__NONE__";

/// The concrete set of filenames a module deploys.
///
/// `NoneSelected` and `AllFiles` both start from "no explicit names" but mean
/// opposite things: the first deploys nothing (every included file was
/// excluded), the second deploys every file in the source directory. Cleanup
/// runs in both cases.
///
/// # Examples
///
/// ```
/// use dotconfigs::config::EffectiveSet;
///
/// let inc = vec!["a".to_string(), "b".to_string(), "c".to_string()];
/// let exc = vec!["b".to_string()];
/// assert_eq!(
///     EffectiveSet::resolve(&inc, &exc),
///     EffectiveSet::Explicit(vec!["a".into(), "c".into()])
/// );
/// assert_eq!(EffectiveSet::resolve(&inc, &inc), EffectiveSet::NoneSelected);
/// assert_eq!(EffectiveSet::resolve(&[], &exc), EffectiveSet::AllFiles);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectiveSet {
    /// No include list: every regular file directly inside the source.
    AllFiles,
    /// `include − exclude`, in include order, without duplicates.
    Explicit(Vec<String>),
    /// A non-empty include list that exclusion emptied.
    NoneSelected,
}

impl EffectiveSet {
    /// Compute `include − exclude`.
    #[must_use]
    pub fn resolve(include: &[String], exclude: &[String]) -> Self {
        if include.is_empty() {
            return Self::AllFiles;
        }
        let excluded: HashSet<&str> = exclude.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        let names: Vec<String> = include
            .iter()
            .filter(|name| !excluded.contains(name.as_str()))
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect();
        if names.is_empty() {
            Self::NoneSelected
        } else {
            Self::Explicit(names)
        }
    }

    /// Render in the legacy comma-separated form: `""` for all files,
    /// `"__NONE__"` for none selected.
    #[must_use]
    pub fn to_csv(&self) -> String {
        match self {
            Self::AllFiles => String::new(),
            Self::Explicit(names) => names.join(","),
            Self::NoneSelected => NONE_SENTINEL.to_string(),
        }
    }

    /// Parse the legacy comma-separated form produced by [`to_csv`](Self::to_csv).
    #[must_use]
    pub fn from_csv(csv: &str) -> Self {
        match csv.trim() {
            "" => Self::AllFiles,
            NONE_SENTINEL => Self::NoneSelected,
            list => {
                let names: Vec<String> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
                Self::resolve(&names, &[])
            }
        }
    }
}

impl std::fmt::Display for EffectiveSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllFiles => f.write_str("all files"),
            Self::Explicit(names) => f.write_str(&names.join(", ")),
            Self::NoneSelected => f.write_str("none (all excluded)"),
        }
    }
}
