//! # Configuration Management Module
//!
//! Runtime settings for the serial protocol service, loaded from a TOML file.
//!
//! ## Configuration Structure
//!
//! - [`ProtocolConfig`] - line capacity, prompt and ACK/NACK marker prefix
//! - [`SerialConfig`] - device port and baud rate
//! - [`OutputsConfig`] - names of the outputs `gpo` may switch
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use serialprot::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Serial Port: {}", config.serial.port);
//!
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [protocol]
//! buffer_capacity = 20
//! prompt = "Input> "
//! marker_prefix = ""
//!
//! [serial]
//! port = "/dev/ttyACM0"
//! baud_rate = 115200
//!
//! [outputs]
//! names = ["gn", "bl", "rt"]
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every section may be omitted; missing values fall back to the defaults
//! shown above. CLI arguments override the file where both exist.

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::fs;

use crate::protocol::frame::MAX_PARAM_LEN;
use crate::protocol::response::DEFAULT_PROMPT;

/// Largest accepted line capacity.
pub const MAX_BUFFER_CAPACITY: usize = 255;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub protocol: ProtocolConfig,
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Characters accepted before a carriage return; one more is an overflow.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Prepended to both markers, e.g. "STM32-" renders "STM32-ACK -> ".
    #[serde(default)]
    pub marker_prefix: String,
}

fn default_buffer_capacity() -> usize {
    20
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
            prompt: default_prompt(),
            marker_prefix: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyACM0".to_string(),
            baud_rate: 115200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputsConfig {
    pub names: Vec<String>,
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            names: vec!["gn".into(), "bl".into(), "rt".into()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Parsed level; unknown strings fall back to `Info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config = Self::from_toml(&content)
            .map_err(|e| anyhow!("Invalid config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let content = toml::to_string_pretty(&Config::default())
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let cap = self.protocol.buffer_capacity;
        if cap == 0 || cap > MAX_BUFFER_CAPACITY {
            bail!(
                "protocol.buffer_capacity must be between 1 and {} (got {})",
                MAX_BUFFER_CAPACITY,
                cap
            );
        }
        if self.protocol.prompt.is_empty() {
            bail!("protocol.prompt must not be empty");
        }
        if self.serial.baud_rate == 0 {
            bail!("serial.baud_rate must be non-zero");
        }
        let mut seen = HashSet::new();
        for name in &self.outputs.names {
            // gpo targets travel as a text parameter, so they must fit one
            if name.is_empty()
                || name.len() > MAX_PARAM_LEN
                || !name.bytes().all(|b| b.is_ascii_alphabetic())
            {
                bail!(
                    "outputs.names entry '{}' must be 1-{} ASCII letters",
                    name,
                    MAX_PARAM_LEN
                );
            }
            if !seen.insert(name.as_str()) {
                bail!("outputs.names contains '{}' twice", name);
            }
        }
        Ok(())
    }
}
