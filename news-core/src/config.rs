use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::NewsError;

const APP_DIR: &str = "portal-news";
const CONFIG_PATH_ENV: &str = "PORTAL_NEWS_CONFIG";
const BIND_ENV: &str = "PORTAL_NEWS_BIND";
const ADMIN_TOKEN_ENV: &str = "PORTAL_NEWS_ADMIN_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub feeds: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Bearer token accepted for settings writes. Writes are refused when unset.
    pub admin_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub request_timeout_seconds: u64,
    pub user_agent: String,
    /// Where admin-written settings are persisted. In-memory only when unset.
    pub settings_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:4000".to_string(),
            admin_token: None,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 10,
            user_agent: format!("portal-news/{}", env!("CARGO_PKG_VERSION")),
            settings_path: None,
        }
    }
}

impl FeedConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.max(1))
    }
}

impl AppConfig {
    pub fn app_dir() -> Result<PathBuf, NewsError> {
        let config_dir = dirs::config_dir().ok_or(NewsError::ConfigDirUnavailable)?;
        Ok(config_dir.join(APP_DIR))
    }

    /// `$PORTAL_NEWS_CONFIG` if set, otherwise `<config dir>/portal-news/config.json`.
    pub fn config_file_path() -> Result<PathBuf, NewsError> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        Ok(Self::app_dir()?.join("config.json"))
    }

    /// Loads the configuration, falling back to defaults on any failure.
    /// Environment overrides are applied last.
    pub fn load() -> Self {
        let mut config = match Self::config_file_path() {
            Ok(path) => Self::load_or_init(&path),
            Err(e) => {
                warn!(error = %e, "cannot locate config file, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        config.fill_settings_path();
        config
    }

    fn load_or_init(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "failed to load config, using defaults");
                let default_config = Self::default();
                if let Err(save_err) = default_config.save_to(path) {
                    debug!(error = %save_err, "could not write default config");
                }
                default_config
            }
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, NewsError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), NewsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(bind) = std::env::var(BIND_ENV) {
            if !bind.trim().is_empty() {
                self.server.bind_addr = bind.trim().to_string();
            }
        }
        if let Ok(token) = std::env::var(ADMIN_TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.server.admin_token = Some(token.trim().to_string());
            }
        }
    }

    fn fill_settings_path(&mut self) {
        if self.feeds.settings_path.is_none() {
            self.feeds.settings_path = Self::app_dir().ok().map(|dir| dir.join("settings.json"));
        }
    }
}
