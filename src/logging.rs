//! Logging setup
//!
//! The library only emits `tracing` events. Binaries call [`init_logging`] to
//! install a `tracing-subscriber` formatter on stderr. The filter comes from
//! `LAZYSEQ_LOG` when set, otherwise from the verbosity count.

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "LAZYSEQ_LOG";

/// Default level for a `-v` count.
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Filter from `LAZYSEQ_LOG`, falling back to the verbosity level.
pub fn build_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(verbosity: u8) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::ConfigError(format!("failed to initialise logging: {}", e)))
}
