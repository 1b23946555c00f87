//! Command-line entry point for dotconfigs.

use std::process::ExitCode;

use dotconfigs::cli::{self, Cli, Command, EXIT_USAGE};
use dotconfigs::commands;
use dotconfigs::error::exit_code_for;
use dotconfigs::logging::{self, Logger};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();

    let args = cli::normalize_args(
        std::env::args_os()
            .map(|a| a.to_string_lossy().into_owned())
            .collect(),
    );
    let args = match <Cli as clap::Parser>::try_parse_from(args) {
        Ok(args) => args,
        Err(err) => return parse_failure(&err),
    };

    let name = args.command.name();
    logging::init_subscriber(args.verbose, name);
    let log = Logger::new(name);

    let result = match &args.command {
        Command::Deploy(opts) => commands::deploy::run(&args.global, opts, &log),
        Command::Project(opts) => commands::project::run(&args.global, opts, &log),
        Command::ProjectInit(opts) => commands::project_init::run(&args.global, opts, &log),
        Command::GlobalInit(opts) => commands::global_init::run(&args.global, opts, &log),
        Command::Status(opts) => commands::status::run(&args.global, opts, &log),
        Command::Setup => commands::setup::run(&args.global, &log),
    };

    match result {
        Ok(()) => {
            if log.warning_count() > 0 {
                log.info(&format!("Completed with {} warning(s)", log.warning_count()));
            }
            log.print_log_location();
            ExitCode::SUCCESS
        }
        Err(err) => {
            log.error(&format!("{err:#}"));
            log.print_log_location();
            ExitCode::from(exit_code_for(&err))
        }
    }
}

/// Report a command-line parse failure and pick the exit status.
#[allow(clippy::print_stderr)]
fn parse_failure(err: &clap::Error) -> ExitCode {
    if let Some(message) = cli::render_parse_error(err) {
        eprintln!("{message}");
        eprintln!("Run 'dotconfigs help' for usage.");
        return ExitCode::from(EXIT_USAGE);
    }
    let _ = err.print();
    ExitCode::from(cli::parse_exit_status(err))
}
