//! Command-line interface definitions.
use std::path::PathBuf;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Parser, Subcommand};

/// Version string embedded by the build script, falling back to the crate version.
pub const VERSION: &str = match option_env!("DOTCONFIGS_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

/// Exit status for unknown commands, unknown options, and other usage errors.
pub const EXIT_USAGE: u8 = 2;

/// Top-level CLI entry point for the deployment engine.
#[derive(Parser, Debug)]
#[command(
    name = "dotconfigs",
    about = "Declarative dotfile and project configuration deployment",
    version = VERSION,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Override the dotconfigs repository root
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deploy global configuration into the home directory
    Deploy(DeployOpts),
    /// Deploy project configuration into a project
    Project(ProjectOpts),
    /// Create .dotconfigs/project.json from plugin manifests
    ProjectInit(ProjectInitOpts),
    /// Create .dotconfigs/global.json from plugin manifests
    GlobalInit(InitOpts),
    /// Show deployment status
    Status(StatusOpts),
    /// One-time setup of the dotconfigs repository
    Setup,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Deploy(_) => "deploy",
            Self::Project(_) => "project",
            Self::ProjectInit(_) => "project-init",
            Self::GlobalInit(_) => "global-init",
            Self::Status(_) => "status",
            Self::Setup => "setup",
        }
    }
}

/// Options for the `deploy` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct DeployOpts {
    /// Deploy only modules of this plugin
    #[arg(long)]
    pub group: Option<String>,

    /// Preview changes without applying
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Accepted for compatibility; conflicts are always resolved in favour of
    /// foreign files
    #[arg(long, hide = true)]
    pub force: bool,
}

/// Options for the `project` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct ProjectOpts {
    /// Project directory (default: current directory)
    pub dir: Option<PathBuf>,

    /// Deploy options
    #[command(flatten)]
    pub deploy: DeployOpts,
}

/// Options for the `project-init` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct ProjectInitOpts {
    /// Project directory (default: current directory)
    pub dir: Option<PathBuf>,

    /// Overwrite an existing project.json
    #[arg(long)]
    pub force: bool,
}

/// Options for the `global-init` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InitOpts {
    /// Overwrite an existing global.json
    #[arg(long)]
    pub force: bool,
}

/// Options for the `status` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct StatusOpts {
    /// Project directory; global status when omitted
    pub dir: Option<PathBuf>,
}

/// Rewrite `project init ...` into `project-init ...`.
///
/// Only the first positional token is considered the command; the value of
/// `--root` is skipped over.
#[must_use]
pub fn normalize_args(args: Vec<String>) -> Vec<String> {
    let mut command_at = None;
    let mut skip_value = false;
    for (i, arg) in args.iter().enumerate().skip(1) {
        if skip_value {
            skip_value = false;
            continue;
        }
        if arg == "--root" {
            skip_value = true;
            continue;
        }
        if !arg.starts_with('-') {
            command_at = Some(i);
            break;
        }
    }

    let Some(i) = command_at else {
        return args;
    };
    if args.get(i).map(String::as_str) != Some("project")
        || args.get(i + 1).map(String::as_str) != Some("init")
    {
        return args;
    }

    let mut out = Vec::with_capacity(args.len().saturating_sub(1));
    for (j, arg) in args.into_iter().enumerate() {
        if j == i {
            out.push("project-init".to_string());
        } else if j != i + 1 {
            out.push(arg);
        }
    }
    out
}

/// Exit status for a parse failure.
///
/// Help and version output, including the usage shown for a bare
/// invocation, succeed; everything else is a usage error.
#[must_use]
pub fn parse_exit_status(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        _ => EXIT_USAGE,
    }
}

/// One-line message for parse errors that name an unknown command or option.
///
/// Returns `None` for every other kind of error, which clap renders itself.
#[must_use]
pub fn render_parse_error(err: &clap::Error) -> Option<String> {
    let (label, context) = match err.kind() {
        ErrorKind::InvalidSubcommand => ("Unknown command", ContextKind::InvalidSubcommand),
        ErrorKind::UnknownArgument => ("Unknown option", ContextKind::InvalidArg),
        _ => return None,
    };
    match err.get(context) {
        Some(ContextValue::String(value)) => Some(format!("{label}: {value}")),
        _ => None,
    }
}
