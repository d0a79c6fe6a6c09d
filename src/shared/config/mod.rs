//! Application configuration module
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables. [`AppConfigBuilder`] is itself deserializable
//! so a TOML file only needs to name the keys it overrides.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::shared::location::Coordinates;

/// Default backend URL
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

pub const ENV_API_BASE_URL: &str = "RIDEDASH_API_BASE_URL";
pub const ENV_MAPS_API_KEY: &str = "RIDEDASH_MAPS_API_KEY";
pub const ENV_SESSION_FILE: &str = "RIDEDASH_SESSION_FILE";
pub const ENV_DEVICE_POSITION: &str = "RIDEDASH_DEVICE_POSITION";

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the rides backend, without a trailing slash
    pub api_base_url: String,
    /// Maps provider key; only the navigation map link depends on it
    pub maps_api_key: Option<String>,
    /// Where the session is persisted; `None` selects the platform data dir
    pub session_file: Option<PathBuf>,
    /// Fixed device position; `None` means geolocation is unsupported
    pub device_position: Option<Coordinates>,
    pub search_debounce_ms: u64,
    pub geolocation_timeout_ms: u64,
    pub navigation_refresh_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            maps_api_key: None,
            session_file: None,
            device_position: None,
            search_debounce_ms: 300,
            geolocation_timeout_ms: 10_000,
            navigation_refresh_secs: 5,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::MissingValue("api_base_url"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(url.to_string()));
        }
        for (key, value) in [
            ("search_debounce_ms", self.search_debounce_ms),
            ("geolocation_timeout_ms", self.geolocation_timeout_ms),
            ("navigation_refresh_secs", self.navigation_refresh_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn has_maps_key(&self) -> bool {
        self.maps_api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_ms)
    }

    pub fn navigation_refresh(&self) -> Duration {
        Duration::from_secs(self.navigation_refresh_secs)
    }
}

/// Builder for AppConfig
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfigBuilder {
    api_base_url: Option<String>,
    maps_api_key: Option<String>,
    session_file: Option<PathBuf>,
    device_position: Option<Coordinates>,
    search_debounce_ms: Option<u64>,
    geolocation_timeout_ms: Option<u64>,
    navigation_refresh_secs: Option<u64>,
}

impl AppConfigBuilder {
    /// Parse a (partial) TOML configuration file.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Set the backend URL
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn maps_api_key(mut self, key: impl Into<String>) -> Self {
        self.maps_api_key = Some(key.into());
        self
    }

    pub fn session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    pub fn device_position(mut self, position: Coordinates) -> Self {
        self.device_position = Some(position);
        self
    }

    pub fn search_debounce_ms(mut self, ms: u64) -> Self {
        self.search_debounce_ms = Some(ms);
        self
    }

    pub fn geolocation_timeout_ms(mut self, ms: u64) -> Self {
        self.geolocation_timeout_ms = Some(ms);
        self
    }

    pub fn navigation_refresh_secs(mut self, secs: u64) -> Self {
        self.navigation_refresh_secs = Some(secs);
        self
    }

    /// Override values from environment-style lookups. `lookup` is
    /// `std::env::var(..).ok()` in production.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = Some(url);
        }
        if let Some(key) = lookup(ENV_MAPS_API_KEY) {
            self.maps_api_key = Some(key);
        }
        if let Some(path) = lookup(ENV_SESSION_FILE) {
            self.session_file = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(ENV_DEVICE_POSITION) {
            self.device_position = Some(parse_position(&raw)?);
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            api_base_url: self
                .api_base_url
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            maps_api_key: self.maps_api_key.filter(|k| !k.trim().is_empty()),
            session_file: self.session_file,
            device_position: self.device_position,
            search_debounce_ms: self.search_debounce_ms.unwrap_or(defaults.search_debounce_ms),
            geolocation_timeout_ms: self
                .geolocation_timeout_ms
                .unwrap_or(defaults.geolocation_timeout_ms),
            navigation_refresh_secs: self
                .navigation_refresh_secs
                .unwrap_or(defaults.navigation_refresh_secs),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Parse `"lat,lng"`.
fn parse_position(raw: &str) -> Result<Coordinates, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: ENV_DEVICE_POSITION,
        value: raw.to_string(),
    };
    let (lat, lng) = raw.split_once(',').ok_or_else(invalid)?;
    let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let longitude: f64 = lng.trim().parse().map_err(|_| invalid())?;
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(invalid());
    }
    Ok(Coordinates::new(latitude, longitude))
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
}
