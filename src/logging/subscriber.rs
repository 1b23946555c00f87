//! Tracing subscriber: console rendering, the persistent log file, and setup.
use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Event target for stage headers.
pub(super) const STAGE_TARGET: &str = "dotconfigs::stage";

/// Event target for dry-run actions.
pub(super) const DRY_RUN_TARGET: &str = "dotconfigs::dry_run";

/// How an event is presented, decided once from its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Stage,
    DryRun,
    Info,
    Debug,
    Warn,
    Error,
}

impl Kind {
    fn of(event: &Event<'_>) -> Self {
        let meta = event.metadata();
        match *meta.level() {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO => match meta.target() {
                STAGE_TARGET => Self::Stage,
                DRY_RUN_TARGET => Self::DryRun,
                _ => Self::Info,
            },
            _ => Self::Debug,
        }
    }

    /// Tag written before the message in the log file.
    const fn file_tag(self) -> &'static str {
        match self {
            Self::Stage => "==> ",
            Self::DryRun => "    [dry run] ",
            Self::Info => "    ",
            Self::Debug => "    [debug] ",
            Self::Warn => "    [warn] ",
            Self::Error => "    [error] ",
        }
    }
}

/// The `message` field of an event.
fn message(event: &Event<'_>) -> String {
    #[derive(Default)]
    struct Message(String);

    impl Visit for Message {
        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "message" {
                value.clone_into(&mut self.0);
            }
        }

        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    let mut visitor = Message::default();
    event.record(&mut visitor);
    visitor.0
}

/// A [`tracing_subscriber::Layer`] appending every event to a log file,
/// timestamped and without ANSI escapes.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<File>,
}

impl FileLayer {
    /// Open `<cache>/dotconfigs/<command>.log`, replacing the previous run.
    ///
    /// `None` when the cache directory or the file is unusable; the run then
    /// logs to the console only.
    pub(super) fn new(command: &str) -> Option<Self> {
        Self::at(&log_file_path(command)?)
    }

    /// Open a log file at an explicit path.
    pub(super) fn at(path: &Path) -> Option<Self> {
        let version = option_env!("DOTCONFIGS_VERSION")
            .unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let rule = "=".repeat(42);
        std::fs::write(
            path,
            format!("{rule}\ndotconfigs {version} {}\n{rule}\n", format_utc_datetime()),
        )
        .ok()?;
        let file = OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let line = format!(
            "[{}] {}{}",
            format_utc_time(),
            Kind::of(event).file_tag(),
            strip_ansi(&message(event))
        );
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }
}

/// Console rendering: bold stage headers, prefixed warnings, errors and
/// dry-run actions, indented progress.
struct ConsoleFormatter;

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let msg = message(event);
        match Kind::of(event) {
            Kind::Stage => writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Kind::DryRun => writeln!(writer, "  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
            Kind::Info => writeln!(writer, "  {msg}"),
            Kind::Debug => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
            Kind::Warn => writeln!(writer, "\x1b[33mWarning:\x1b[0m {msg}"),
            Kind::Error => writeln!(writer, "\x1b[31mError:\x1b[0m {msg}"),
        }
    }
}

/// Install the global subscriber for a run of `command`.
///
/// Warnings and errors are written to standard error and everything else to
/// standard output. Debug events reach the console only when `verbose`; the
/// log file always receives them. Call once, before the first event.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::Layer as _;
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let console_filter = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let streams = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(ConsoleFormatter)
                .with_writer(streams)
                .with_filter(console_filter),
        )
        .with(FileLayer::new(command).map(|layer| layer.with_filter(LevelFilter::DEBUG)))
        .init();
}
