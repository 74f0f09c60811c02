//! Service configuration: TOML file plus environment overrides.

use std::path::{Path, PathBuf};

use di_search::CollectConfig;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "DI_AGENT_CONFIG";

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Listen address.
    pub host: String,
    /// Listen port. `0` picks a free port.
    pub port: u16,
    /// Collection pipeline settings, including API credentials.
    pub collect: CollectConfig,
    /// Optional self-ping.
    pub keepalive: KeepaliveConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
            collect: CollectConfig::default(),
            keepalive: KeepaliveConfig::default(),
        }
    }
}

/// Periodic GET against the service's own public URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepaliveConfig {
    /// Public base URL of this service. `None` disables the pinger.
    pub self_url: Option<String>,
    /// Seconds between pings.
    pub interval_seconds: u64,
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            self_url: None,
            interval_seconds: 300,
        }
    }
}

impl AgentConfig {
    /// Load from the default location, apply environment overrides and
    /// validate. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, an
    /// override is malformed, or the result fails validation.
    pub fn load() -> Result<Self> {
        let path = Self::default_config_path();
        let mut config = if path.exists() {
            tracing::info!(path = %path.display(), "loading config");
            Self::from_file(&path)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AgentError::Config(e.to_string()))
    }

    /// Returns the config file path: `$DI_AGENT_CONFIG`, else
    /// `~/.config/di-agent/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(explicit) = std::env::var_os(CONFIG_PATH_ENV) {
            PathBuf::from(explicit)
        } else if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("di-agent").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("di-agent")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/di-agent-config/config.toml")
        }
    }

    /// Apply `PORT`, API key and `KEEPALIVE_URL` overrides from `lookup`.
    ///
    /// Empty or whitespace-only values count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if `PORT` is not a valid port number.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        if let Some(port) = get("PORT") {
            self.port = port
                .parse()
                .map_err(|e| AgentError::Config(format!("invalid PORT {port:?}: {e}")))?;
        }
        let credentials = &mut self.collect.credentials;
        if let Some(key) = get("YOUTUBE_API_KEY") {
            credentials.youtube_api_key = Some(key);
        }
        if let Some(key) = get("FLICKR_API_KEY") {
            credentials.flickr_api_key = Some(key);
        }
        if let Some(key) = get("BRAVE_SEARCH_API_KEY") {
            credentials.web_search_api_key = Some(key);
        }
        if let Some(url) = get("KEEPALIVE_URL") {
            self.keepalive.self_url = Some(url);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the collection settings are invalid or the
    /// keep-alive interval is zero.
    pub fn validate(&self) -> Result<()> {
        self.collect.validate()?;
        if self.keepalive.interval_seconds == 0 {
            return Err(AgentError::Config(
                "keepalive.interval_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
