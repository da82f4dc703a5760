//! `tracing` subscriber setup for hosts embedding this crate.
//!
//! The library itself only emits `trace!` diagnostics; errors are returned, never logged.

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;

const DEFAULT_FILTER: &str = "warn";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid ADK_SESSION_LOG filter '{directives}': {source}")]
    InvalidFilter {
        directives: String,
        #[source]
        source: ParseError,
    },
}

/// Builds the filter from `ADK_SESSION_LOG`, then `RUST_LOG`, then `warn`.
///
/// An unparsable `ADK_SESSION_LOG` is an error. An unparsable `RUST_LOG` falls through to
/// the default.
pub fn env_filter(config: &EnvConfig) -> Result<EnvFilter, LoggingError> {
    if let Some(directives) = config.log_filter.as_deref() {
        return EnvFilter::try_new(directives).map_err(|source| LoggingError::InvalidFilter {
            directives: directives.to_string(),
            source,
        });
    }

    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
}

/// Installs a global fmt subscriber. Returns `Ok(false)` when one was already installed.
pub fn init(config: &EnvConfig) -> Result<bool, LoggingError> {
    let filter = env_filter(config)?;
    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok())
}
