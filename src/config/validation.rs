//! Post-load checks that warn about modules likely to misbehave.
use std::path::{Component, Path};

use super::DeployConfig;
use super::module::{ModuleSpec, is_plain_filename};

/// A validation warning detected after a configuration is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The module that triggered the warning, as `plugin.module`.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning for `item`.
    #[must_use]
    pub fn new(item: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.item, self.message)
    }
}

/// Trait for configuration validators.
///
/// Validators report problems that do not make the document unusable but
/// will likely surprise the user at deploy time.
pub trait ConfigValidator {
    /// Validate one module and return any warnings found.
    fn validate(&self, item: &str, module: &ModuleSpec, repo_root: &Path)
    -> Vec<ValidationWarning>;

    /// Return a human-readable name for this validator.
    fn name(&self) -> &'static str;
}

/// Checks that module sources are relative paths inside the repository.
#[derive(Debug, Default)]
pub struct SourceValidator;

impl ConfigValidator for SourceValidator {
    fn validate(
        &self,
        item: &str,
        module: &ModuleSpec,
        _repo_root: &Path,
    ) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let source = Path::new(&module.source);

        if source.is_absolute() {
            warnings.push(ValidationWarning::new(
                item,
                "source path should be relative to the repository root",
            ));
        } else if source.components().any(|c| c == Component::ParentDir) {
            warnings.push(ValidationWarning::new(
                item,
                format!("source '{}' points outside the repository", module.source),
            ));
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "source"
    }
}

/// Checks exclude entries and the include/exclude pairing.
///
/// Include entries that are not plain filenames never get this far: they
/// make the document invalid.
#[derive(Debug, Default)]
pub struct FileListValidator;

impl ConfigValidator for FileListValidator {
    fn validate(
        &self,
        item: &str,
        module: &ModuleSpec,
        _repo_root: &Path,
    ) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let include = module.include.as_deref().unwrap_or_default();
        let exclude = module.exclude.as_deref().unwrap_or_default();

        for name in exclude {
            if !is_plain_filename(name) {
                warnings.push(ValidationWarning::new(
                    item,
                    format!("exclude entry '{name}' is not a plain filename and matches nothing"),
                ));
            }
        }

        if include.is_empty() && !exclude.is_empty() {
            warnings.push(ValidationWarning::new(
                item,
                "exclude has no effect without an include list",
            ));
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "file-list"
    }
}

/// Run every validator against every module of `config`.
#[must_use]
pub fn validate_all(config: &DeployConfig, repo_root: &Path) -> Vec<ValidationWarning> {
    let validators: [&dyn ConfigValidator; 2] = [&SourceValidator, &FileListValidator];
    let mut warnings = Vec::new();

    for (plugin, modules) in &config.plugins {
        for (name, module) in modules {
            let item = format!("{plugin}.{name}");
            for validator in validators {
                warnings.extend(validator.validate(&item, module, repo_root));
            }
        }
    }

    warnings
}
