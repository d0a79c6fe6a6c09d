use std::path::PathBuf;

use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};

/// Names a TOML file layered between the defaults and the environment
pub const ENV_CONFIG_FILE: &str = "RIDEDASH_CONFIG";

const SESSION_DIR: &str = "ridedash";
const SESSION_FILE: &str = "session.json";

/// Client configuration wrapper.
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_app(app: AppConfig) -> Self {
        Self { app }
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self { app: builder.build()? })
    }

    /// Defaults, then the file named by `RIDEDASH_CONFIG`, then `RIDEDASH_*`
    /// environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = match std::env::var(ENV_CONFIG_FILE) {
            Ok(path) => {
                tracing::debug!(path = %path, "loading config file");
                AppConfigBuilder::from_toml(&std::fs::read_to_string(path)?)?
            }
            Err(_) => AppConfigBuilder::default(),
        };
        let builder = builder.apply_env(|key| std::env::var(key).ok())?;
        Self::with_builder(builder)
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.app.api_base_url, path)
    }

    pub fn api_base_url(&self) -> &str {
        &self.app.api_base_url
    }

    pub fn maps_api_key(&self) -> Option<&str> {
        self.app.maps_api_key.as_deref()
    }

    /// Where the session is persisted.
    pub fn session_file(&self) -> PathBuf {
        self.app.session_file.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(SESSION_DIR)
                .join(SESSION_FILE)
        })
    }
}
