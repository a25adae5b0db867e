// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is read from `config.toml` (by default in the user config
//! directory under `booker/`). Every field is optional; missing fields take
//! their defaults. `BK_BASE_URL` and `BK_DB_PATH` override the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};
use crate::sync::{ChannelConfig, CoordinatorOptions};

const APP_DIR_NAME: &str = "booker";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "appointments.db";

/// Client configuration stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// REST base URL of the appointment service. The push channel URL is
    /// derived from it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the local store. Defaults to `appointments.db` in the state
    /// directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    /// Timeout of the availability probe in milliseconds (default: 2000).
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Timeout of regular requests in milliseconds (default: 10000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// How long an own create is recognized as an echo (default: 3000).
    #[serde(default = "default_echo_window_ms")]
    pub echo_window_ms: u64,
    /// Delay before the push channel reconnects (default: 5000).
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Interval of the network path check in milliseconds (default: 5000).
    #[serde(default = "default_reachability_poll_ms")]
    pub reachability_poll_ms: u64,
    /// How long store notifications are ignored after an own write
    /// (default: 250).
    #[serde(default = "default_store_settle_ms")]
    pub store_settle_ms: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    2_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_echo_window_ms() -> u64 {
    3_000
}

fn default_reconnect_delay_ms() -> u64 {
    5_000
}

fn default_reachability_poll_ms() -> u64 {
    5_000
}

fn default_store_settle_ms() -> u64 {
    250
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: default_base_url(),
            db_path: None,
            probe_timeout_ms: default_probe_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            echo_window_ms: default_echo_window_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            reachability_poll_ms: default_reachability_poll_ms(),
            store_settle_ms: default_store_settle_ms(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Config::default());
            }
            Err(e) => return Err(e.into()),
        };
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Applies `BK_BASE_URL` and `BK_DB_PATH` on top of the file values.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(url) = env::base_url() {
            self.base_url = url;
        }
        if let Some(path) = env::db_path() {
            self.db_path = Some(path);
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks values the client cannot work with.
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "invalid base_url '{}': must start with http:// or https://",
                self.base_url
            )));
        }
        if self.probe_timeout_ms == 0 || self.request_timeout_ms == 0 {
            return Err(Error::Config("timeouts must be greater than zero".into()));
        }
        if self.reachability_poll_ms == 0 {
            return Err(Error::Config(
                "reachability_poll_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Resolves the local store path against the state directory.
    pub fn db_path_in(&self, state_dir: &Path) -> PathBuf {
        match &self.db_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => state_dir.join(path),
            None => state_dir.join(DB_FILE_NAME),
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn reachability_poll(&self) -> Duration {
        Duration::from_millis(self.reachability_poll_ms)
    }

    pub fn coordinator_options(&self) -> CoordinatorOptions {
        CoordinatorOptions {
            echo_window: Duration::from_millis(self.echo_window_ms),
            store_settle: Duration::from_millis(self.store_settle_ms),
        }
    }

    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig::for_base_url(&self.base_url)
            .with_reconnect_delay(Duration::from_millis(self.reconnect_delay_ms))
    }
}

/// Returns the state directory holding the local store.
///
/// `BK_STATE_DIR` wins, then `$XDG_STATE_HOME/booker`, then
/// `~/.local/state/booker`.
pub fn state_dir() -> PathBuf {
    if let Some(dir) = env::state_dir() {
        return dir;
    }
    if let Some(dir) = env::xdg_state_home() {
        return dir.join(APP_DIR_NAME);
    }
    dirs::home_dir()
        .map(|h| h.join(".local/state").join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".local/state").join(APP_DIR_NAME))
}

/// Returns the default location of `config.toml`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(state_dir)
        .join(CONFIG_FILE_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
