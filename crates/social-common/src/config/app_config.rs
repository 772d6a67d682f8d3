//! Application configuration structs
//!
//! Loads configuration from environment variables (and `.env` when present).

use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub redis: RedisConfig,
    pub stream: StreamConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(ConfigError::InvalidValue("APP_ENV", s.to_string())),
        }
    }
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// State change stream configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Key prefix; the stream of an entity kind is `{prefix}:{kind}`
    #[serde(default = "default_stream_prefix")]
    pub prefix: String,
    #[serde(default = "default_stream_group")]
    pub group: String,
    #[serde(default = "default_stream_consumer")]
    pub consumer: String,
    /// How long one blocking read waits before polling again
    #[serde(default = "default_stream_block_ms")]
    pub block_ms: u64,
}

impl StreamConfig {
    /// Stream key for an entity kind
    #[must_use]
    pub fn key(&self, kind: &str) -> String {
        format!("{}:{kind}", self.prefix)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            prefix: default_stream_prefix(),
            group: default_stream_group(),
            consumer: default_stream_consumer(),
            block_ms: default_stream_block_ms(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "social-worker".to_string()
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_stream_prefix() -> String {
    "social".to_string()
}

fn default_stream_group() -> String {
    "social-worker".to_string()
}

fn default_stream_consumer() -> String {
    "worker-0".to_string()
}

fn default_stream_block_ms() -> u64 {
    5000
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or a
    /// value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Load configuration from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(String::as_str);

        Ok(Self {
            app: AppSettings {
                name: get("APP_NAME").map_or_else(default_app_name, String::from),
                env: get("APP_ENV")
                    .map(str::parse::<Environment>)
                    .transpose()?
                    .unwrap_or_default(),
            },
            redis: RedisConfig {
                url: get("REDIS_URL")
                    .map(String::from)
                    .ok_or(ConfigError::MissingVar("REDIS_URL"))?,
                max_connections: parse_or(
                    vars,
                    "REDIS_MAX_CONNECTIONS",
                    default_redis_max_connections(),
                )?,
            },
            stream: StreamConfig {
                prefix: get("STREAM_PREFIX").map_or_else(default_stream_prefix, String::from),
                group: get("STREAM_GROUP").map_or_else(default_stream_group, String::from),
                consumer: get("STREAM_CONSUMER").map_or_else(default_stream_consumer, String::from),
                block_ms: parse_or(vars, "STREAM_BLOCK_MS", default_stream_block_ms())?,
            },
        })
    }
}

fn parse_or<T: FromStr>(
    vars: &HashMap<String, String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match vars.get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw.clone())),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
