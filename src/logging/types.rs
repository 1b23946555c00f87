//! The [`Log`] trait shared by the console logger and test recorders.

/// Abstraction over logging backends.
///
/// The engine logs through `&dyn Log` so that it never depends on how output
/// is rendered. [`Logger`](super::logger::Logger) forwards to `tracing`;
/// tests substitute a recorder.
pub trait Log: Send + Sync {
    /// Log a stage header (one per module or command phase).
    fn stage(&self, msg: &str);
    /// Log an informational progress message.
    fn info(&self, msg: &str);
    /// Log a debug message (console only in verbose mode).
    fn debug(&self, msg: &str);
    /// Log a warning on the diagnostic stream.
    fn warn(&self, msg: &str);
    /// Log an error on the diagnostic stream.
    fn error(&self, msg: &str);
    /// Log an action that dry-run mode skipped.
    fn dry_run(&self, msg: &str);
}

/// Severity of a recorded message, used by test recorders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Stage header.
    Stage,
    /// Progress message.
    Info,
    /// Debug detail.
    Debug,
    /// Warning.
    Warn,
    /// Error.
    Error,
    /// Dry-run action.
    DryRun,
}
