use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::{ProtocolError, Result};
use crate::utils::timeout::{DEFAULT_TIMEOUT, SHUTDOWN_TIMEOUT};

/// Strict binary protocol version word (high 16 bits of message begin)
pub const BINARY_VERSION_1: u32 = 0x8001_0000;

/// Mask selecting the version bits of the message-begin word
pub const VERSION_MASK: u32 = 0xffff_0000;

/// Max allowed frame size (e.g. 16 MB)
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Default server bind address
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:9090";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "DATALINK_PROTOCOL";

/// Server-side settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub max_frame_size: usize,
    #[serde(with = "duration_millis")]
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_SERVER_ADDRESS.to_string(),
            max_frame_size: MAX_FRAME_SIZE,
            shutdown_timeout: SHUTDOWN_TIMEOUT,
        }
    }
}

/// Client-side settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub address: String,
    #[serde(with = "duration_millis")]
    pub connection_timeout: Duration,
    #[serde(with = "duration_millis")]
    pub response_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_SERVER_ADDRESS.to_string(),
            connection_timeout: DEFAULT_TIMEOUT,
            response_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Logging settings, converted to `utils::logging::LogConfig` at startup
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub app_name: String,
    #[serde(with = "level_str")]
    pub log_level: Level,
    pub log_to_console: bool,
    pub log_to_file: bool,
    pub log_dir: Option<String>,
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: "datalink-protocol".to_string(),
            log_level: Level::INFO,
            log_to_console: true,
            log_to_file: false,
            log_dir: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Build the logging-subsystem configuration from these settings
    pub fn to_log_config(&self) -> crate::utils::logging::LogConfig {
        let log_dir = if self.log_to_file {
            Some(
                self.log_dir
                    .clone()
                    .unwrap_or_else(|| "logs".to_string()),
            )
        } else {
            None
        };

        crate::utils::logging::LogConfig {
            app_name: self.app_name.clone(),
            log_level: self.log_level,
            json_format: self.json_format,
            log_dir,
            log_to_stdout: self.log_to_console,
        }
    }
}

/// Aggregated runtime configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}

impl NetworkConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| ProtocolError::Config(e.to_string()))
    }

    /// Build configuration from defaults plus `DATALINK_PROTOCOL_*`
    /// environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = env_var("SERVER_ADDRESS") {
            config.server.address = addr;
        }
        if let Some(size) = env_var("MAX_FRAME_SIZE") {
            config.server.max_frame_size = parse_env("MAX_FRAME_SIZE", &size)?;
        }
        if let Some(ms) = env_var("SHUTDOWN_TIMEOUT_MS") {
            config.server.shutdown_timeout =
                Duration::from_millis(parse_env("SHUTDOWN_TIMEOUT_MS", &ms)?);
        }
        if let Some(addr) = env_var("CLIENT_ADDRESS") {
            config.client.address = addr;
        }
        if let Some(ms) = env_var("CONNECTION_TIMEOUT_MS") {
            config.client.connection_timeout =
                Duration::from_millis(parse_env("CONNECTION_TIMEOUT_MS", &ms)?);
        }
        if let Some(ms) = env_var("RESPONSE_TIMEOUT_MS") {
            config.client.response_timeout =
                Duration::from_millis(parse_env("RESPONSE_TIMEOUT_MS", &ms)?);
        }
        if let Some(level) = env_var("LOG_LEVEL") {
            config.logging.log_level = Level::from_str(&level)
                .map_err(|e| ProtocolError::Config(format!("invalid LOG_LEVEL: {e}")))?;
        }

        Ok(config)
    }

    /// Build a default configuration and apply programmatic overrides
    pub fn default_with_overrides<F>(overrides: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        overrides(&mut config);
        config
    }

    /// Persist configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ProtocolError::Config(e.to_string()))?;
        fs::write(path, contents)?;
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| ProtocolError::Config(format!("invalid {ENV_PREFIX}_{name}: {e}")))
}

/// Durations are written to TOML as integer milliseconds
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Log levels are written to TOML as lowercase strings
mod level_str {
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};
    use tracing::Level;

    pub fn serialize<S: Serializer>(level: &Level, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&level.to_string().to_lowercase())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Level, D::Error> {
        let raw = String::deserialize(d)?;
        Level::from_str(&raw).map_err(de::Error::custom)
    }
}
