use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::channel::{ChannelOptions, DEFAULT_SKIP_THRESHOLD};
use crate::transport::curl::{CurlOptions, CurlTransport, DEFAULT_READ_AHEAD};

/// Transport parameters (optional `[transport]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Hard limit for one whole transfer in seconds (None = no limit; channels
    /// may keep a body open for a long time).
    pub timeout_secs: Option<u64>,
    /// Abort a transfer whose throughput stays below this many bytes/s for
    /// `low_speed_time_secs` (None = disabled).
    pub low_speed_limit: Option<u32>,
    pub low_speed_time_secs: u64,
    /// Redirects followed per request; 0 disables following.
    pub max_redirections: u32,
    /// Optional bandwidth cap in bytes per second.
    pub max_bytes_per_sec: Option<u64>,
    /// Optional curl receive buffer size in bytes (None = library default).
    pub buffer_size: Option<usize>,
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: None,
            low_speed_limit: None,
            low_speed_time_secs: 60,
            max_redirections: 10,
            max_bytes_per_sec: None,
            buffer_size: None,
            user_agent: None,
        }
    }
}

/// Global configuration loaded from `~/.config/rangeseek/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeseekConfig {
    /// Largest forward seek (bytes) served by discarding from the open body
    /// instead of issuing a new range request.
    pub skip_threshold: u64,
    /// Body bytes buffered ahead of the reader before the transfer is paused.
    pub read_ahead_bytes: usize,
    pub transport: TransportConfig,
}

impl Default for RangeseekConfig {
    fn default() -> Self {
        Self {
            skip_threshold: DEFAULT_SKIP_THRESHOLD,
            read_ahead_bytes: DEFAULT_READ_AHEAD,
            transport: TransportConfig::default(),
        }
    }
}

impl RangeseekConfig {
    pub fn channel_options(&self) -> ChannelOptions {
        ChannelOptions {
            skip_threshold: self.skip_threshold,
        }
    }

    pub fn curl_transport(&self) -> CurlTransport {
        CurlTransport::new(CurlOptions::from_config(
            &self.transport,
            self.read_ahead_bytes,
        ))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rangeseek")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RangeseekConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RangeseekConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<RangeseekConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: RangeseekConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
