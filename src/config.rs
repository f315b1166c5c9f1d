//! Daemon and client configuration: built-in defaults, an optional TOML
//! file, then command-line overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use zbus::names::{InterfaceName, WellKnownName};
use zbus::zvariant::ObjectPath;

use crate::led::DEFAULT_BLINK_HALF_PERIOD_MS;

pub const DEFAULT_SERVICE_NAME: &str = "com.walbrix.LedIndicatorService";
pub const DEFAULT_OBJECT_PATH: &str = "/com/walbrix/LedIndicator";
pub const DEFAULT_INTERFACE_NAME: &str = "com.walbrix.LedIndicator";
pub const DEFAULT_CHIPNAME: &str = "gpiochip0";
pub const DEFAULT_LINE: u32 = 13;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub bus: BusConfig,

    #[serde(default)]
    pub led: LedConfig,

    /// File the panic handler appends crash reports to, in addition to stderr
    #[serde(default)]
    pub crash_log: Option<PathBuf>,
}

/// Names under which the daemon is reachable on the system bus.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BusConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,

    #[serde(default = "default_object_path")]
    pub object_path: String,

    #[serde(default = "default_interface_name")]
    pub interface_name: String,
}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.into()
}

fn default_object_path() -> String {
    DEFAULT_OBJECT_PATH.into()
}

fn default_interface_name() -> String {
    DEFAULT_INTERFACE_NAME.into()
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            object_path: default_object_path(),
            interface_name: default_interface_name(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LedConfig {
    /// GPIO chip name (e.g. "gpiochip0") or device path
    #[serde(default = "default_chipname")]
    pub chipname: String,

    /// Line offset on the chip
    #[serde(default = "default_line")]
    pub line: u32,

    /// How long the pin holds each level while blinking
    #[serde(default = "default_blink_half_period_ms")]
    pub blink_half_period_ms: u64,

    /// Upper bound on each wait of the event loop. This is also the latency
    /// of blink edges and of shutdown, so it must not exceed half of
    /// `blink_half_period_ms`.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_chipname() -> String {
    DEFAULT_CHIPNAME.into()
}

fn default_line() -> u32 {
    DEFAULT_LINE
}

fn default_blink_half_period_ms() -> u64 {
    DEFAULT_BLINK_HALF_PERIOD_MS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            chipname: default_chipname(),
            line: default_line(),
            blink_half_period_ms: default_blink_half_period_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl LedConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Values given on the command line. `None` keeps the file/default value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub service_name: Option<String>,
    pub object_path: Option<String>,
    pub interface_name: Option<String>,
    pub chipname: Option<String>,
    pub line: Option<u32>,
    pub blink_half_period_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
}

impl Config {
    /// Load config from `path` if given, otherwise start from defaults.
    ///
    /// A path named explicitly must exist; nothing is created on disk.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;
                let config: Config = toml::from_str(&contents)?;
                info!("Loaded config from: {}", path.display());
                Ok(config)
            }
            None => {
                debug!("No config file given, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// Load, apply command-line overrides, then validate.
    pub fn resolve(path: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(name) = overrides.service_name {
            self.bus.service_name = name;
        }
        if let Some(path) = overrides.object_path {
            self.bus.object_path = path;
        }
        if let Some(name) = overrides.interface_name {
            self.bus.interface_name = name;
        }
        if let Some(chip) = overrides.chipname {
            self.led.chipname = chip;
        }
        if let Some(line) = overrides.line {
            self.led.line = line;
        }
        if let Some(half_period) = overrides.blink_half_period_ms {
            self.led.blink_half_period_ms = half_period;
        }
        if let Some(interval) = overrides.poll_interval_ms {
            self.led.poll_interval_ms = interval;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        WellKnownName::try_from(self.bus.service_name.as_str()).map_err(|e| {
            ConfigError::ValidationError(format!(
                "invalid service name {:?}: {}",
                self.bus.service_name, e
            ))
        })?;
        ObjectPath::try_from(self.bus.object_path.as_str()).map_err(|e| {
            ConfigError::ValidationError(format!(
                "invalid object path {:?}: {}",
                self.bus.object_path, e
            ))
        })?;
        InterfaceName::try_from(self.bus.interface_name.as_str()).map_err(|e| {
            ConfigError::ValidationError(format!(
                "invalid interface name {:?}: {}",
                self.bus.interface_name, e
            ))
        })?;

        if self.led.chipname.is_empty() {
            return Err(ConfigError::ValidationError(
                "chipname must not be empty".into(),
            ));
        }

        if self.led.blink_half_period_ms == 0 {
            return Err(ConfigError::ValidationError(
                "blink_half_period_ms must be positive".into(),
            ));
        }

        if self.led.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_ms must be positive".into(),
            ));
        }

        if self.led.poll_interval_ms > self.led.blink_half_period_ms / 2 {
            return Err(ConfigError::ValidationError(format!(
                "poll_interval_ms ({}) must be at most half of blink_half_period_ms ({})",
                self.led.poll_interval_ms, self.led.blink_half_period_ms
            )));
        }

        Ok(())
    }
}
