//! Log file location, escape stripping, and timestamps.
use std::path::PathBuf;

use chrono::Utc;

/// Remove ANSI escape sequences so log files stay plain text.
///
/// A CSI sequence (`ESC [` ... final byte in `@`..=`~`) is dropped whole; any
/// other escape drops itself and the one character after it.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        if chars.next() == Some('[') {
            chars.by_ref().find(|ch| ('@'..='~').contains(ch));
        }
    }
    out
}

/// `$XDG_CACHE_HOME/dotconfigs`, falling back to `~/.cache/dotconfigs`.
///
/// Created on first use; `None` when that fails.
pub(super) fn cache_dir() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME")
                .or_else(|| std::env::var_os("USERPROFILE"))
                .map(|home| PathBuf::from(home).join(".cache"))
        })
        .unwrap_or_else(|| PathBuf::from(".cache"));
    let dir = base.join("dotconfigs");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Log file for one command, e.g. `deploy.log`.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(command).with_extension("log"))
}

/// Current UTC date and time, `YYYY-MM-DD HH:MM:SS`.
pub(super) fn format_utc_datetime() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Current UTC time of day, `HH:MM:SS`.
pub(super) fn format_utc_time() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}
