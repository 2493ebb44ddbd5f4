//! Subscriber installation for structured `tracing` output.
//!
//! Library code only emits events through the `tracing` macros; binaries call
//! [`init`] once at startup. `RUST_LOG` takes precedence over the level the
//! caller passes in.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The fallback directive did not parse.
    #[error("invalid log filter '{directive}': {reason}")]
    InvalidFilter {
        /// Rejected directive.
        directive: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A global subscriber was already installed.
    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

/// Builds the filter used by [`init`].
///
/// # Errors
///
/// Returns [`LoggingError::InvalidFilter`] when `RUST_LOG` is unset and
/// `fallback` is not a valid directive.
pub fn build_filter(fallback: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(fallback).map_err(|err| LoggingError::InvalidFilter {
            directive: fallback.to_owned(),
            reason: err.to_string(),
        })
    })
}

/// Installs a formatted subscriber writing to standard error.
///
/// # Errors
///
/// Returns [`LoggingError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init(fallback: &str) -> Result<(), LoggingError> {
    let filter = build_filter(fallback)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| LoggingError::Install(err.to_string()))
}
