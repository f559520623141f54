//! Configuration for the sealwire CLI
//!
//! Stored as TOML. Default location:
//!
//! - Unix: `~/.config/sealwire/config.toml`
//! - Windows: `%APPDATA%\sealwire\config\config.toml`
//!
//! Command line flags override file values.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sealwire_client::ChannelConfig;

use crate::cli::Cli;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// CLI configuration
///
/// # Example TOML
///
/// ```toml
/// [channel]
/// max_frame_len = 16777216
/// role = "shared"  # "shared" | "initiator" | "responder"
///
/// [network]
/// listen = "127.0.0.1:7878"
/// connect = "127.0.0.1:7878"
/// timeout_seconds = 30
///
/// [keys]
/// path = "/etc/sealwire/keys.toml"
///
/// [logging]
/// level = "warn"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub channel: ChannelConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub keys: KeysConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Address `serve` binds to
    #[serde(default = "default_addr")]
    pub listen: String,

    /// Address `send` connects to
    #[serde(default = "default_addr")]
    pub connect: String,

    /// Per-operation timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_addr() -> String {
    "127.0.0.1:7878".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen: default_addr(),
            connect: default_addr(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Key file location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeysConfig {
    /// Path to the key file (empty = default location)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Values taken from command line flags. `None` leaves the file value alone.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub listen: Option<String>,
    pub connect: Option<String>,
    pub keys_path: Option<PathBuf>,
    pub timeout_seconds: Option<u64>,
    pub max_frame_len: Option<usize>,
    pub verbose: Option<bool>,
    pub debug: Option<bool>,
}

impl From<&Cli> for CliOverrides {
    fn from(cli: &Cli) -> Self {
        Self {
            listen: cli.listen_override(),
            connect: cli.connect_override(),
            keys_path: cli.keys.clone(),
            timeout_seconds: cli.timeout,
            max_frame_len: cli.max_frame_len,
            verbose: cli.verbose.then_some(true),
            debug: cli.debug.then_some(true),
        }
    }
}

impl Config {
    /// Load configuration from file.
    ///
    /// Values are not validated here; call [`Config::validate`] once CLI
    /// overrides have been applied.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from default location, falling back to defaults
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from custom path or default
    pub fn load_from(custom_path: Option<&Path>) -> Result<Self, ConfigError> {
        match custom_path {
            Some(path) => Self::load(path),
            None => Self::load_default(),
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("io", "sealwire", "sealwire")
    }

    pub fn default_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Default key file path, used when `[keys] path` is unset
    pub fn default_keys_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().join("keys.toml"))
    }

    /// Key file to use: configured path or the default location
    pub fn keys_path(&self) -> Option<PathBuf> {
        self.keys.path.clone().or_else(Self::default_keys_path)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.channel
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        for (name, addr) in [
            ("listen", &self.network.listen),
            ("connect", &self.network.connect),
        ] {
            if addr.parse::<SocketAddr>().is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid {name} address '{addr}': expected host:port"
                )));
            }
        }

        if self.network.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log level '{}'. Valid values: {:?}",
                self.logging.level, valid_levels
            )));
        }

        Ok(())
    }

    /// Apply command line overrides. CLI values win.
    pub fn with_overrides(mut self, overrides: &CliOverrides) -> Self {
        if let Some(listen) = &overrides.listen {
            self.network.listen = listen.clone();
        }
        if let Some(connect) = &overrides.connect {
            self.network.connect = connect.clone();
        }
        if let Some(path) = &overrides.keys_path {
            self.keys.path = Some(path.clone());
        }
        if let Some(timeout) = overrides.timeout_seconds {
            self.network.timeout_seconds = timeout;
        }
        if let Some(max) = overrides.max_frame_len {
            self.channel.max_frame_len = max;
        }
        if overrides.verbose == Some(true) {
            self.logging.level = "info".to_string();
        }
        if overrides.debug == Some(true) {
            self.logging.level = "debug".to_string();
        }
        self
    }
}
