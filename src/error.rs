//! Domain-specific error types for the deployment engine.
//!
//! Internal modules return typed errors ([`DeployError`], [`ProjectError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! DeployError
//! ├── ConfigMissing:  configuration file absent (fatal)
//! ├── ConfigInvalid:  malformed or schema-violating JSON (fatal)
//! ├── SourceMissing:  included file has no source (warning, counted skipped)
//! ├── PathConflict:   target occupied by the wrong kind of entry (warning)
//! └── Filesystem:     create/replace/remove failed (fatal)
//!
//! ProjectError:       CLI-level project/repository preconditions
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Exit status for configuration failures (missing or invalid document).
pub const EXIT_CONFIG: u8 = 2;

/// Exit status for filesystem failures during a run.
pub const EXIT_FILESYSTEM: u8 = 1;

/// Errors raised by the deployment engine.
///
/// `SourceMissing` and `PathConflict` are never returned from a deploy run;
/// they are rendered as warnings so one bad entry does not abort the others.
#[derive(Error, Debug)]
pub enum DeployError {
    /// The configuration document does not exist.
    #[error("Configuration not found: {}", path.display())]
    ConfigMissing {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The configuration document could not be parsed as the expected schema.
    #[error("Invalid configuration {}: {message}", path.display())]
    ConfigInvalid {
        /// Path of the offending document.
        path: PathBuf,
        /// Parser message (includes line/column when available).
        message: String,
    },

    /// An included file has no counterpart in the source directory.
    #[error("Source not found, skipping: {}", path.display())]
    SourceMissing {
        /// Expected source path.
        path: PathBuf,
    },

    /// A target path holds an entry of an unexpected kind.
    #[error("Path conflict at {}: {reason}", path.display())]
    PathConflict {
        /// Conflicting target path.
        path: PathBuf,
        /// What was found there.
        reason: String,
    },

    /// A filesystem operation failed while creating, replacing, or removing an entry.
    #[error(transparent)]
    Filesystem(#[from] anyhow::Error),
}

impl DeployError {
    /// Whether this error aborts a run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::SourceMissing { .. } | Self::PathConflict { .. })
    }

    /// Process exit status for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigMissing { .. } | Self::ConfigInvalid { .. } => EXIT_CONFIG,
            Self::Filesystem(_) => EXIT_FILESYSTEM,
            Self::SourceMissing { .. } | Self::PathConflict { .. } => 0,
        }
    }
}

/// Errors raised by project- and repository-level commands.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// The directory is not the root of a git repository.
    #[error("Not a git repository: {} (run `git init` first)", path.display())]
    NotGitRepository {
        /// Directory that was checked.
        path: PathBuf,
    },

    /// `project` was run before `project-init`.
    #[error("No project.json found at {} (run `dotconfigs project-init` first)", path.display())]
    ProjectConfigMissing {
        /// Expected location of project.json.
        path: PathBuf,
    },

    /// `deploy` was run before `global-init`.
    #[error("No global.json found at {} (run `dotconfigs global-init` first)", path.display())]
    GlobalConfigMissing {
        /// Expected location of global.json.
        path: PathBuf,
    },

    /// Neither `HOME` nor `USERPROFILE` is set.
    #[error("Cannot determine home directory: HOME is not set")]
    HomeUnavailable,
}

impl ProjectError {
    /// Process exit status for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::ProjectConfigMissing { .. } | Self::GlobalConfigMissing { .. } => EXIT_CONFIG,
            Self::NotGitRepository { .. } | Self::HomeUnavailable => EXIT_FILESYSTEM,
        }
    }
}

/// Exit status for an error that reached the command boundary.
///
/// Looks through the context chain for a typed error; anything untyped is a
/// generic failure.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| {
            cause
                .downcast_ref::<DeployError>()
                .map(DeployError::exit_code)
                .or_else(|| cause.downcast_ref::<ProjectError>().map(ProjectError::exit_code))
        })
        .unwrap_or(EXIT_FILESYSTEM)
}
