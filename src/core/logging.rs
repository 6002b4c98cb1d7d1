//! Logging setup
//!
//! Installs a `tracing-subscriber` fmt subscriber. `RUST_LOG`, when set, wins
//! over the configured level so a single run can be turned up without editing
//! the config file.

use crate::core::config::LoggingConfig;
use crate::core::error::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Build the env filter for a logging configuration
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global subscriber
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr);

    let installed = match config.format.as_str() {
        "compact" => builder.compact().try_init(),
        _ => builder.pretty().try_init(),
    };

    installed.map_err(|e| Error::config(format!("Failed to install logger: {}", e)))
}
