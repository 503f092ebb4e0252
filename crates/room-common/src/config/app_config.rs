//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when
//! one is present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: ServerConfig,
    pub store: StoreConfig,
    pub chat: ChatConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            env: Environment::default(),
            log_format: LogFormat::default(),
        }
    }
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

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Which store implementation backs the room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

/// Store selection; `database` is always set for the postgres backend
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    pub database: Option<DatabaseConfig>,
}

impl StoreConfig {
    /// In-process store, no database
    #[must_use]
    pub fn memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            database: None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Room behaviour: rate limiting, history size, keepalive
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_rate_limit_messages")]
    pub rate_limit_messages: u32,
    #[serde(default = "default_rate_limit_window_ms")]
    pub rate_limit_window_ms: u64,
    #[serde(default = "default_rate_limit_sweep_ms")]
    pub rate_limit_sweep_ms: u64,
    #[serde(default = "default_history_limit")]
    pub history_limit: i64,
    #[serde(default = "default_keepalive_interval_ms")]
    pub keepalive_interval_ms: u64,
}

impl ChatConfig {
    #[must_use]
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }

    #[must_use]
    pub fn rate_limit_sweep(&self) -> Duration {
        Duration::from_millis(self.rate_limit_sweep_ms)
    }

    #[must_use]
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_millis(self.keepalive_interval_ms)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            rate_limit_messages: default_rate_limit_messages(),
            rate_limit_window_ms: default_rate_limit_window_ms(),
            rate_limit_sweep_ms: default_rate_limit_sweep_ms(),
            history_limit: default_history_limit(),
            keepalive_interval_ms: default_keepalive_interval_ms(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "room-gateway".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_rate_limit_messages() -> u32 {
    10
}

fn default_rate_limit_window_ms() -> u64 {
    60_000
}

fn default_rate_limit_sweep_ms() -> u64 {
    60_000
}

fn default_history_limit() -> i64 {
    100
}

fn default_keepalive_interval_ms() -> u64 {
    30_000
}

impl AppConfig {
    /// Defaults backed by the in-process store
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            app: AppSettings::default(),
            gateway: ServerConfig::default(),
            store: StoreConfig::memory(),
            chat: ChatConfig::default(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV") {
            None => Environment::default(),
            Some(s) => match s.to_lowercase().as_str() {
                "production" => Environment::Production,
                "staging" => Environment::Staging,
                "development" => Environment::Development,
                _ => return Err(ConfigError::InvalidValue("APP_ENV", s)),
            },
        };

        let log_format = match lookup("LOG_FORMAT") {
            None => LogFormat::default(),
            Some(s) => match s.to_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => return Err(ConfigError::InvalidValue("LOG_FORMAT", s)),
            },
        };

        let backend = match lookup("STORE_BACKEND") {
            None => StoreBackend::default(),
            Some(s) => match s.to_lowercase().as_str() {
                "postgres" => StoreBackend::Postgres,
                "memory" => StoreBackend::Memory,
                _ => return Err(ConfigError::InvalidValue("STORE_BACKEND", s)),
            },
        };

        let database = match backend {
            StoreBackend::Memory => None,
            StoreBackend::Postgres => Some(DatabaseConfig {
                url: lookup("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: parse_or(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    default_max_connections(),
                )?,
                min_connections: parse_or(
                    &lookup,
                    "DATABASE_MIN_CONNECTIONS",
                    default_min_connections(),
                )?,
            }),
        };

        let chat = ChatConfig {
            rate_limit_messages: parse_or(
                &lookup,
                "RATE_LIMIT_MESSAGES",
                default_rate_limit_messages(),
            )?,
            rate_limit_window_ms: parse_or(
                &lookup,
                "RATE_LIMIT_WINDOW_MS",
                default_rate_limit_window_ms(),
            )?,
            rate_limit_sweep_ms: parse_or(
                &lookup,
                "RATE_LIMIT_SWEEP_MS",
                default_rate_limit_sweep_ms(),
            )?,
            history_limit: parse_or(&lookup, "HISTORY_LIMIT", default_history_limit())?,
            keepalive_interval_ms: parse_or(
                &lookup,
                "KEEPALIVE_INTERVAL_MS",
                default_keepalive_interval_ms(),
            )?,
        };

        if chat.rate_limit_messages == 0 {
            return Err(ConfigError::InvalidValue("RATE_LIMIT_MESSAGES", "0".into()));
        }
        for (key, value) in [
            ("RATE_LIMIT_WINDOW_MS", chat.rate_limit_window_ms),
            ("RATE_LIMIT_SWEEP_MS", chat.rate_limit_sweep_ms),
            ("KEEPALIVE_INTERVAL_MS", chat.keepalive_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue(key, "0".into()));
            }
        }
        if chat.history_limit <= 0 {
            return Err(ConfigError::InvalidValue(
                "HISTORY_LIMIT",
                chat.history_limit.to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
                log_format,
            },
            gateway: ServerConfig {
                host: lookup("GATEWAY_HOST").unwrap_or_else(default_host),
                port: parse_or(&lookup, "GATEWAY_PORT", default_port())?,
            },
            store: StoreConfig { backend, database },
            chat,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
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
