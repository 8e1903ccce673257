use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{HiveError, HiveResult};

/// Default HiveServer port
pub const DEFAULT_PORT: u16 = 10000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub hive: HiveConfig,
    pub logging: LoggingConfig,
}

/// Connection settings for one Hive adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiveConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    /// Connection timeout in milliseconds
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for HiveConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            database: "default".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl HiveConfig {
    /// Parse a `hive://host[:port][/database]` URL
    pub fn from_url(connection_url: &str) -> HiveResult<Self> {
        let url = url::Url::parse(connection_url)
            .map_err(|e| HiveError::InvalidConfig(format!("Invalid Hive URL: {}", e)))?;

        if url.scheme() != "hive" && url.scheme() != "thrift" {
            return Err(HiveError::InvalidConfig(format!(
                "URL must use hive:// or thrift:// scheme, got: {}",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| HiveError::InvalidConfig("Missing host in Hive URL".to_string()))?;

        let database = url.path().trim_matches('/');
        let defaults = HiveConfig::default();

        Ok(Self {
            host: host.to_string(),
            port: url.port().unwrap_or(DEFAULT_PORT),
            database: if database.is_empty() {
                defaults.database
            } else {
                database.to_string()
            },
            timeout_ms: defaults.timeout_ms,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> HiveResult<()> {
        if self.host.trim().is_empty() {
            return Err(HiveError::InvalidConfig("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(HiveError::InvalidConfig("port must not be 0".to_string()));
        }
        if self.database.trim().is_empty() {
            return Err(HiveError::InvalidConfig("database must not be empty".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(HiveError::InvalidConfig("timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from defaults, `HIVE_CONFIG_FILE`, `.env` and the environment
    pub fn from_env() -> HiveResult<Self> {
        // Try to load from .env file
        let _ = dotenv::dotenv();

        let file = env::var("HIVE_CONFIG_FILE").ok().map(PathBuf::from);
        Self::load(file.as_deref(), |key| env::var(key).ok())
    }

    /// Load configuration from defaults, an optional file and a variable lookup
    pub fn load<F>(file: Option<&Path>, var: F) -> HiveResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = HiveConfig::default();
        let mut builder = config::Config::builder()
            .set_default("hive.host", defaults.host)?
            .set_default("hive.port", i64::from(defaults.port))?
            .set_default("hive.database", defaults.database)?
            .set_default("hive.timeout_ms", defaults.timeout_ms as i64)?
            .set_default("logging.level", "info")?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        // A full URL sets host, port and database at once; the individual
        // variables below still win over it
        if let Some(url) = var("HIVE_URL") {
            let parsed = HiveConfig::from_url(&url)?;
            builder = builder
                .set_override("hive.host", parsed.host)?
                .set_override("hive.port", i64::from(parsed.port))?
                .set_override("hive.database", parsed.database)?;
        }

        if let Some(host) = var("HIVE_HOST") {
            builder = builder.set_override("hive.host", host)?;
        }

        if let Some(port) = var("HIVE_PORT") {
            let port: u16 = port
                .parse()
                .map_err(|_| HiveError::InvalidConfig(format!("Invalid HIVE_PORT: {}", port)))?;
            builder = builder.set_override("hive.port", i64::from(port))?;
        }

        if let Some(database) = var("HIVE_DATABASE") {
            builder = builder.set_override("hive.database", database)?;
        }

        if let Some(timeout) = var("HIVE_TIMEOUT_MS") {
            let timeout: u64 = timeout.parse().map_err(|_| {
                HiveError::InvalidConfig(format!("Invalid HIVE_TIMEOUT_MS: {}", timeout))
            })?;
            builder = builder.set_override("hive.timeout_ms", timeout as i64)?;
        }

        if let Some(log_level) = var("RUST_LOG") {
            builder = builder.set_override("logging.level", log_level)?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.hive.validate()?;
        Ok(config)
    }
}
