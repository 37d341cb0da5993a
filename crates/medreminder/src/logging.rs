//! Logging setup for medreminder.
//!
//! Diagnostics go to stderr through `tracing`; command output (schedules,
//! summaries) is printed separately to stdout, so `-q` only silences the
//! former.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Warnings and above. Rejected operations show up here.
    #[default]
    Normal,
    /// Info and debug, including every registry mutation.
    Verbose,
    /// Everything, including schedule expansion.
    Trace,
}

impl Verbosity {
    /// Map `-q` and the number of `-v` flags to a level. `-q` wins.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Trace,
        }
    }

    /// Convert verbosity to tracing level filter.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Initialize the logging system.
///
/// Call once at startup. `RUST_LOG`, when set, takes precedence over
/// `verbosity`. Repeated calls are ignored.
pub fn init_logging(verbosity: Verbosity) {
    let default_filter = format!("medreminder={}", verbosity.to_level_filter());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time(),
    );

    let _ = subscriber.try_init();
}

/// Initialize logging for tests: warnings and up, through the test writer.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
