//! Diagnostic logging setup
//!
//! Diagnostics are written to stderr so they never mix with the report on stdout.

use std::io::{self, IsTerminal};
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding a filter directive, e.g. `KEYSTAT_LOG=debug`
pub const LOG_ENV: &str = "KEYSTAT_LOG";

/// Verbosity selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings only (unprintable bytes, chopped tags)
    Quiet,
    /// Warnings plus timing
    #[default]
    Normal,
    /// Also trace every counted token
    Verbose,
}

impl Verbosity {
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else if quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }

    fn default_directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
        }
    }
}

/// Install the stderr subscriber. `KEYSTAT_LOG` overrides the verbosity flags.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directive()));

    // A second init (tests) keeps the first subscriber.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(true, false), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Verbose);
    }

    #[test]
    fn test_default_directives() {
        assert_eq!(Verbosity::Quiet.default_directive(), "warn");
        assert_eq!(Verbosity::Normal.default_directive(), "info");
        assert_eq!(Verbosity::Verbose.default_directive(), "debug");
    }
}
