//! Logging initialization for `nbgallery`.
//!
//! Provides structured logging via `tracing` with human-readable and
//! JSON output formats, three verbosity levels, and environment-based
//! override via `NBGALLERY_LOG_LEVEL`.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{ColorChoice, LogFormat};

/// Maps the `-v`/`-q` flags to a tracing directive string.
///
/// - `quiet` → `"error"`
/// - 0 → `"info"`
/// - 1 → `"debug"`
/// - 2+ → `"trace"` (saturates)
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Whether human-format logs should carry ANSI colors.
///
/// `auto` colors only a terminal stderr, and `NO_COLOR` turns it off.
#[must_use]
pub fn ansi_enabled(color: ColorChoice) -> bool {
    match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => {
            std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
        }
    }
}

/// Installs the global subscriber, writing to stderr.
///
/// `NBGALLERY_LOG_LEVEL` (an `EnvFilter` directive such as
/// `nbgallery::gallery=debug`) wins over the flags. Targets are shown from
/// `-v` up. JSON lines carry event fields at the top level.
///
/// A second call is a no-op (`try_init`), which keeps tests simple.
pub fn init_logging(format: LogFormat, verbosity: u8, quiet: bool, color: ColorChoice) {
    let filter = EnvFilter::try_from_env("NBGALLERY_LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity, quiet)));
    let with_target = !quiet && verbosity > 0;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(with_target)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Human => builder.with_ansi(ansi_enabled(color)).try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
}
