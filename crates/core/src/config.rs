//! Service settings.
//!
//! Built-in defaults are overlaid by an optional `storefront.toml` (or
//! `config/storefront.toml`) and then by `STOREFRONT_*` environment
//! variables. The result is validated once, before anything connects.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["storefront.toml", "config/storefront.toml"];

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Where to look for the settings file. Without an explicit path the
/// default locations are probed and a missing file is not an error.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("config file `{0}` does not exist")]
    MissingConfigFile(PathBuf),
    #[error("invalid value `{value}` in `{key}`")]
    InvalidEnvOverride { key: &'static str, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://storefront.db?mode=rwc".to_string(),
            max_connections: 5,
            timeout_secs: 30,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1".to_string(), port: 3000, graceful_shutdown_secs: 15 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Compact }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = match settings_file(options.config_path)? {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
        toml::from_str(&raw)
            .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        env_override(&mut self.database.url, &["STOREFRONT_DATABASE_URL"])?;
        env_override(
            &mut self.database.max_connections,
            &["STOREFRONT_DATABASE_MAX_CONNECTIONS"],
        )?;
        env_override(&mut self.database.timeout_secs, &["STOREFRONT_DATABASE_TIMEOUT_SECS"])?;
        env_override(&mut self.server.bind_address, &["STOREFRONT_SERVER_BIND_ADDRESS"])?;
        env_override(&mut self.server.port, &["STOREFRONT_SERVER_PORT"])?;
        env_override(
            &mut self.server.graceful_shutdown_secs,
            &["STOREFRONT_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        )?;
        env_override(
            &mut self.logging.level,
            &["STOREFRONT_LOGGING_LEVEL", "STOREFRONT_LOG_LEVEL"],
        )?;
        env_override(
            &mut self.logging.format,
            &["STOREFRONT_LOGGING_FORMAT", "STOREFRONT_LOG_FORMAT"],
        )?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.database.url.trim();
        let rules = [
            (
                url.starts_with("sqlite:") || url == ":memory:",
                "database.url must be a sqlite URL (`sqlite:...` or `:memory:`)",
            ),
            (self.database.max_connections > 0, "database.max_connections must be at least 1"),
            (
                (1..=300).contains(&self.database.timeout_secs),
                "database.timeout_secs must be in range 1..=300",
            ),
            (!self.server.bind_address.trim().is_empty(), "server.bind_address must not be empty"),
            (self.server.port > 0, "server.port must be greater than zero"),
            (
                self.server.graceful_shutdown_secs > 0,
                "server.graceful_shutdown_secs must be greater than zero",
            ),
            (
                matches!(
                    self.logging.level.trim().to_ascii_lowercase().as_str(),
                    "trace" | "debug" | "info" | "warn" | "error"
                ),
                "logging.level must be one of trace|debug|info|warn|error",
            ),
        ];

        match rules.iter().find(|(holds, _)| !holds) {
            Some((_, message)) => Err(ConfigError::Validation((*message).to_string())),
            None => Ok(()),
        }
    }

    /// `bind_address:port`, ready for `TcpListener::bind`.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }
}

/// The settings file to read, if any. An explicit path must exist.
pub fn settings_file(explicit: Option<PathBuf>) -> Result<Option<PathBuf>, ConfigError> {
    match explicit {
        Some(path) if path.exists() => Ok(Some(path)),
        Some(path) => Err(ConfigError::MissingConfigFile(path)),
        None => Ok(DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from).find(|path| path.exists())),
    }
}

/// Replaces `target` with the first non-blank variable among `keys`.
fn env_override<T: FromStr>(target: &mut T, keys: &[&'static str]) -> Result<(), ConfigError> {
    let found = keys.iter().find_map(|key| {
        env::var(key).ok().filter(|value| !value.trim().is_empty()).map(|value| (*key, value))
    });

    if let Some((key, value)) = found {
        *target =
            value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride { key, value })?;
    }
    Ok(())
}
