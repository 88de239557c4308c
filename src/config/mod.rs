//! Configuration layer: typed settings with layered precedence (file → env).

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::application::pagination::MAX_PAGE_SIZE;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "chiaro";
const ENV_PREFIX: &str = "CHIARO";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Read(#[from] config::ConfigError),
    #[error("invalid configuration value for `{field}`: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Fully validated runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub generator: GeneratorSettings,
    pub query: QuerySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct GeneratorSettings {
    /// Upper bound on one generator round-trip; overruns surface as
    /// generation failures.
    pub timeout: Duration,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QuerySettings {
    pub default_page_size: u32,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(default)]
    database: RawDatabase,
    #[serde(default)]
    generator: RawGenerator,
    #[serde(default)]
    query: RawQuery,
    #[serde(default)]
    logging: RawLogging,
}

#[derive(Debug, Default, Deserialize)]
struct RawDatabase {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct RawGenerator {
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawQuery {
    default_page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLogging {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl Settings {
    /// Load settings from the default file locations, an optional explicit
    /// file, and `CHIARO__`-prefixed environment variables, in that
    /// precedence order.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
            .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;
        let raw: RawSettings = config.try_deserialize()?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, ConfigError> {
        let url = raw
            .database
            .url
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::invalid("database.url", "a connection URL is required"))?;

        let max_connections = raw
            .database
            .max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        if max_connections == 0 {
            return Err(ConfigError::invalid(
                "database.max_connections",
                "must be at least 1",
            ));
        }

        let timeout_secs = raw
            .generator
            .timeout_secs
            .unwrap_or(DEFAULT_GENERATION_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "generator.timeout_secs",
                "must be at least 1",
            ));
        }

        let default_page_size = raw.query.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if default_page_size == 0 || default_page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::invalid(
                "query.default_page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }

        let level = match raw.logging.level {
            Some(value) => LevelFilter::from_str(&value)
                .map_err(|err| ConfigError::invalid("logging.level", err.to_string()))?,
            None => LevelFilter::INFO,
        };

        Ok(Self {
            database: DatabaseSettings {
                url,
                max_connections,
            },
            generator: GeneratorSettings {
                timeout: Duration::from_secs(timeout_secs),
            },
            query: QuerySettings { default_page_size },
            logging: LoggingSettings {
                level,
                format: raw.logging.format.unwrap_or(LogFormat::Compact),
            },
        })
    }
}
