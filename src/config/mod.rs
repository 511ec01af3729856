//! # Configuration
//!
//! Layered settings: defaults, then an optional `app-config.{yml,toml}`
//! file, then `AGG__`-prefixed environment variables. `.env` is loaded
//! into the process environment first.
//!
//! Nested keys use `__` as separator:
//!
//! - `AGG__SERVER__PORT=8080` sets `server.port`
//! - `AGG__RECONCILIATION__INTERVAL_SECS=30` sets `reconciliation.interval_secs`
//! - `AGG__PROVIDERS__FASTBANK_URL=https://...` sets `providers.fastbank_url`

use ::config::{Config, Environment, File};
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "AGG";

/// Config file looked up in the working directory, extension optional.
pub const CONFIG_FILE: &str = "app-config";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    /// A value is out of range.
    #[error("invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Dotted key.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

impl ConfigError {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(key: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            message: message.into(),
        }
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnv {
    /// Local development, human-readable logs.
    #[default]
    Dev,
    /// Production, JSON logs.
    Prod,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Parses host and port into a socket address.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `host` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| ConfigError::invalid_value("server.host", format!("{e}")))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// PostgreSQL settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// User name.
    pub user: String,
    /// Password.
    pub password: String,
    /// Host name.
    pub host: String,
    /// Port.
    pub port: u16,
    /// Database name.
    pub name: String,
    /// Pool size.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            name: "financing".to_string(),
            max_connections: 10,
        }
    }
}

impl DatabaseConfig {
    /// Returns the connection URL.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }
}

/// Reconciliation schedule.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// Seconds between ticks. Absent disables the scheduler.
    pub interval_secs: Option<u64>,
}

impl ReconciliationConfig {
    /// Returns the tick interval, if any.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        self.interval_secs.map(Duration::from_secs)
    }
}

/// Provider endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// FastBank API base URL.
    pub fastbank_url: String,
    /// SolidBank API base URL.
    pub solidbank_url: String,
    /// Per-call timeout.
    pub timeout_ms: u64,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            fastbank_url: "http://localhost:8081/api".to_string(),
            solidbank_url: "http://localhost:8082/api".to_string(),
            timeout_ms: 5_000,
        }
    }
}

/// Request authentication.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Require a bearer token on API routes.
    pub enabled: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Deployment environment.
    pub env: RuntimeEnv,
    /// HTTP listener.
    pub server: ServerConfig,
    /// PostgreSQL.
    pub database: DatabaseConfig,
    /// Reconciliation schedule.
    pub reconciliation: ReconciliationConfig,
    /// Provider endpoints.
    pub providers: ProvidersConfig,
    /// Request authentication.
    pub auth: AuthConfig,
    /// Logging.
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Loads `.env`, the config file and the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source is malformed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is fine.
        let _ = dotenvy::dotenv();
        Self::build(None)
    }

    /// Loads from an explicit variable map instead of the process
    /// environment. Keys use the same `AGG__` form.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is malformed or invalid.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::build(Some(vars))
    }

    fn build(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?;

        let parsed: Self = config.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;

        if self.database.max_connections == 0 {
            return Err(ConfigError::invalid_value(
                "database.max_connections",
                "must be greater than zero",
            ));
        }
        if self.reconciliation.interval_secs == Some(0) {
            return Err(ConfigError::invalid_value(
                "reconciliation.interval_secs",
                "must be greater than zero; omit it to disable reconciliation",
            ));
        }
        if self.providers.timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "providers.timeout_ms",
                "must be greater than zero",
            ));
        }
        for (key, url) in [
            ("providers.fastbank_url", &self.providers.fastbank_url),
            ("providers.solidbank_url", &self.providers.solidbank_url),
        ] {
            Url::parse(url).map_err(|e| ConfigError::invalid_value(key, format!("{e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::from_vars(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.env, RuntimeEnv::Dev);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.providers.timeout_ms, 5_000);
        assert!(config.auth.enabled);
        assert!(config.reconciliation.interval().is_none());
    }

    #[test]
    fn nested_keys_from_vars() {
        let config = AppConfig::from_vars([
            ("AGG__ENV", "prod"),
            ("AGG__SERVER__PORT", "9000"),
            ("AGG__RECONCILIATION__INTERVAL_SECS", "30"),
            ("AGG__PROVIDERS__FASTBANK_URL", "https://fastbank.example/api"),
            ("AGG__AUTH__ENABLED", "false"),
            ("AGG__DATABASE__NAME", "offers"),
        ])
        .unwrap();

        assert_eq!(config.env, RuntimeEnv::Prod);
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.reconciliation.interval(),
            Some(Duration::from_secs(30))
        );
        assert_eq!(config.providers.fastbank_url, "https://fastbank.example/api");
        assert!(!config.auth.enabled);
        assert!(config.database.url().ends_with("@localhost:5432/offers"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = AppConfig::from_vars([("AGG__RECONCILIATION__INTERVAL_SECS", "0")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "reconciliation.interval_secs",
                ..
            }
        ));
    }

    #[test]
    fn malformed_provider_url_is_rejected() {
        let err = AppConfig::from_vars([("AGG__PROVIDERS__SOLIDBANK_URL", "not a url")]).unwrap_err();
        assert!(err.to_string().contains("providers.solidbank_url"));
    }

    #[test]
    fn bad_host_is_rejected() {
        let config = ServerConfig {
            host: "localhost:80".to_string(),
            port: 1,
        };
        assert!(config.socket_addr().is_err());
    }
}
