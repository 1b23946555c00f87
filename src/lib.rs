//! Declarative dotfile and project configuration deployment.
//!
//! Plugins in a repository describe files to link or copy into the home
//! directory (global scope) or into a project's working tree (project scope).
//! The engine keeps those targets convergent with the configuration across
//! repeated runs and never touches files it does not own.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: JSON configuration documents, include/exclude resolution, manifest assembly
//! - **[`resources`]**: idempotent `check + apply` primitives (symlinks, copies)
//! - **[`engine`]**: module parsing, materialization, cleanup, and the deploy driver
//! - **[`commands`]**: top-level subcommand orchestration (`deploy`, `project`, `status`, …)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod operations;
pub mod resources;
