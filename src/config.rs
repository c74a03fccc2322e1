//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! dashboard-config.toml file. Every section is optional; anything left out
//! takes the default shown below.
//!
//! ```toml
//! [feeder]
//! host = "192.168.31.123"
//! timeout_secs = 5
//!
//! [cache]
//! ttl_secs = 5
//!
//! [files]
//! sample_path = "flight_data.json"
//! raw_dump_path = "last_raw_data.json"
//!
//! [server]
//! bind = "0.0.0.0:5000"
//!
//! [receiver]
//! lat = 53.35
//! lon = -6.26
//! ```
//!
//! The `FLIGHT_FEEDER_IP` environment variable overrides `feeder.host`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "dashboard-config.toml";

/// Environment variable that overrides the feeder host
pub const HOST_ENV: &str = "FLIGHT_FEEDER_IP";

/// Application configuration loaded from dashboard-config.toml
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Flight feeder connection
    pub feeder: FeederConfig,
    /// Snapshot cache
    pub cache: CacheConfig,
    /// Sample fixture and raw dump locations
    pub files: FilesConfig,
    /// HTTP listener for the dashboard
    pub server: ServerConfig,
    /// Position of the receiving antenna, used for range display
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<ReceiverConfig>,
}

/// Flight feeder connection settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FeederConfig {
    /// Host name or IP address of the feeder on the local network
    pub host: String,
    /// Per-endpoint request timeout in seconds
    pub timeout_secs: u64,
}

/// Snapshot cache settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a normalized snapshot is served before refetching
    pub ttl_secs: u64,
}

/// File locations
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Sample feeder payload used when no feeder answers
    pub sample_path: PathBuf,
    /// Where the last raw feeder payload is written
    pub raw_dump_path: PathBuf,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "0.0.0.0:5000"
    pub bind: String,
}

/// Receiving station position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ReceiverConfig {
    pub lat: f64,
    pub lon: f64,
}

impl Default for FeederConfig {
    fn default() -> Self {
        FeederConfig {
            host: "192.168.31.123".to_string(),
            timeout_secs: 5,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig { ttl_secs: 5 }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        FilesConfig {
            sample_path: PathBuf::from("flight_data.json"),
            raw_dump_path: PathBuf::from("last_raw_data.json"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "0.0.0.0:5000".to_string(),
        }
    }
}

impl FeederConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Config {
    /// Load configuration from dashboard-config.toml, then apply the
    /// `FLIGHT_FEEDER_IP` override.
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE).with_host_override(std::env::var(HOST_ENV).ok())
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), host = %config.feeder.host, "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Replace the feeder host when `host` is set and not blank.
    pub fn with_host_override(mut self, host: Option<String>) -> Self {
        if let Some(host) = host.map(|h| h.trim().to_string()).filter(|h| !h.is_empty()) {
            info!(%host, "feeder host overridden from environment");
            self.feeder.host = host;
        }
        self
    }

    /// Receiver position as `(lat, lon)`, if configured.
    pub fn receiver_position(&self) -> Option<(f64, f64)> {
        self.receiver.map(|r| (r.lat, r.lon))
    }

    /// Save current configuration to `path` as pretty TOML
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }
}
