//! # Telemetry
//!
//! Installs the global `tracing` subscriber.

use crate::config::{RuntimeEnv, TelemetryConfig};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Subscriber setup errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter directive does not parse.
    #[error("invalid log filter '{directive}': {message}")]
    InvalidFilter {
        /// Offending directive.
        directive: String,
        /// Parser message.
        message: String,
    },

    /// A global subscriber is already installed.
    #[error("failed to install subscriber: {0}")]
    Install(String),
}

/// Builds the filter: `RUST_LOG` if set, the configured level otherwise.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidFilter` if the configured level does not
/// parse.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::InvalidFilter {
        directive: config.log_level.clone(),
        message: e.to_string(),
    })
}

/// Installs JSON output in production and compact output elsewhere.
///
/// # Errors
///
/// Returns `TelemetryError` if the filter is invalid or a subscriber is
/// already installed.
pub fn init(env: RuntimeEnv, config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match env {
        RuntimeEnv::Prod => builder.json().with_current_span(false).try_init(),
        RuntimeEnv::Dev => builder.compact().with_target(false).try_init(),
    };
    installed.map_err(|e| TelemetryError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_is_reported() {
        let config = TelemetryConfig {
            log_level: "aggregator=loud".to_string(),
        };
        // RUST_LOG takes precedence when the test runner sets it.
        if std::env::var("RUST_LOG").is_err() {
            assert!(matches!(
                env_filter(&config),
                Err(TelemetryError::InvalidFilter { .. })
            ));
        }
    }

    #[test]
    fn plain_level_parses() {
        let config = TelemetryConfig::default();
        assert!(env_filter(&config).is_ok());
    }
}
