// src/config.rs
//! Configuration management for the cluster process

use crate::error::{ClusterError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio_serial::{DataBits, StopBits};

/// Serial receiver settings, all of which have fixed factory defaults
/// (9600 8N1 on /dev/ttyS0) but can be overridden per install.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    /// Minimum number of buffered bytes requested per read.
    pub min_read_size: usize,
    /// How long a line read may wait for device bytes before the tick
    /// gives up with "no data".
    pub read_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyS0".to_string(),
            baud_rate: 9600,
            data_bits: 8,
            stop_bits: 1,
            min_read_size: 4,
            read_timeout_ms: 250,
        }
    }
}

impl SerialConfig {
    /// Validate the configured data bits against what the UART supports.
    pub fn data_bits(&self) -> Result<DataBits> {
        match self.data_bits {
            5 => Ok(DataBits::Five),
            6 => Ok(DataBits::Six),
            7 => Ok(DataBits::Seven),
            8 => Ok(DataBits::Eight),
            n => Err(ClusterError::Config(format!("unsupported data bits: {}", n))),
        }
    }

    /// Validate the configured stop bits against what the UART supports.
    pub fn stop_bits(&self) -> Result<StopBits> {
        match self.stop_bits {
            1 => Ok(StopBits::One),
            2 => Ok(StopBits::Two),
            n => Err(ClusterError::Config(format!("unsupported stop bits: {}", n))),
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub serial: SerialConfig,
    /// Telemetry pump interval in milliseconds.
    pub telemetry_interval_ms: u64,
    /// Clock refresh interval in milliseconds.
    pub clock_interval_ms: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            telemetry_interval_ms: 100,
            clock_interval_ms: 1000,
        }
    }
}

impl ClusterConfig {
    /// Load configuration from the given path, or the default location.
    /// A missing file yields the defaults.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .map_err(|e| ClusterError::Config(format!("failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ClusterError::Config(format!("failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClusterError::Config(format!("failed to create config directory: {}", e)))?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        std::fs::write(&config_path, contents)
            .map_err(|e| ClusterError::Config(format!("failed to write config file: {}", e)))?;

        Ok(())
    }

    fn default_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| ClusterError::Config("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home)
            .join(".config")
            .join("instrument-cluster")
            .join("config.json"))
    }

    /// Apply command-line overrides on top of the loaded file.
    pub fn apply_overrides(&mut self, port: Option<String>, baud: Option<u32>) {
        if let Some(port) = port {
            self.serial.port = port;
        }
        if let Some(baud) = baud {
            self.serial.baud_rate = baud;
        }
    }

    pub fn telemetry_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry_interval_ms)
    }

    pub fn clock_interval(&self) -> Duration {
        Duration::from_millis(self.clock_interval_ms)
    }
}
