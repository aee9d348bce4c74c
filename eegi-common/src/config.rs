//! Configuration loading and resolution
//!
//! Bootstrap configuration lives in a small TOML file. Values resolve in
//! priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file at the default location is not an error: the client
//! logs a warning and continues with compiled defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "EEGI_CONFIG";

/// Environment variable overriding the analysis service base URL
pub const SERVICE_URL_ENV: &str = "EEGI_SERVICE_URL";

/// Bootstrap configuration read from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Remote analysis service endpoints
    #[serde(default)]
    pub service: ServiceConfig,

    /// Ephemeral notice timing
    #[serde(default)]
    pub notice: NoticeConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Route signalled to the downstream view after a successful prediction
    #[serde(default = "default_results_route")]
    pub results_route: String,
}

/// Remote analysis service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL, e.g. `http://localhost:5000`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the multipart upload endpoint
    #[serde(default = "default_upload_path")]
    pub upload_path: String,

    /// Path of the prediction endpoint
    #[serde(default = "default_predict_path")]
    pub predict_path: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Notice configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeConfig {
    /// Delay before a shown notice clears itself
    #[serde(default = "default_dismiss_after_ms")]
    pub dismiss_after_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_upload_path() -> String {
    "/upload/".to_string()
}

fn default_predict_path() -> String {
    "/predict".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_dismiss_after_ms() -> u64 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_results_route() -> String {
    "/prediction".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            upload_path: default_upload_path(),
            predict_path: default_predict_path(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            dismiss_after_ms: default_dismiss_after_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            notice: NoticeConfig::default(),
            logging: LoggingConfig::default(),
            results_route: default_results_route(),
        }
    }
}

impl ServiceConfig {
    /// Full URL of the upload endpoint
    pub fn upload_url(&self) -> String {
        join_url(&self.base_url, &self.upload_path)
    }

    /// Full URL of the prediction endpoint
    pub fn predict_url(&self) -> String {
        join_url(&self.base_url, &self.predict_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl NoticeConfig {
    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.dismiss_after_ms)
    }
}

impl TomlConfig {
    /// Reject values the client cannot run with
    pub fn validate(&self) -> Result<()> {
        let url = self.service.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "service.base_url must start with http:// or https:// (got '{}')",
                self.service.base_url
            )));
        }
        if self.service.request_timeout_secs == 0 {
            return Err(Error::Config(
                "service.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.notice.dismiss_after_ms == 0 {
            return Err(Error::Config(
                "notice.dismiss_after_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Load and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Write config to `path` atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}

/// Default config file location (`~/.config/eegi/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("eegi").join("config.toml"))
}

/// Resolves the effective configuration from CLI, environment and TOML
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_config_path: Option<PathBuf>,
    cli_service_url: Option<String>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config file path given on the command line
    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.cli_config_path = path;
        self
    }

    /// Service base URL given on the command line
    pub fn with_service_url(mut self, url: Option<String>) -> Self {
        self.cli_service_url = url;
        self
    }

    /// Resolve the config file to read, if any.
    ///
    /// Returns the path and whether it was explicitly requested.
    fn config_path(&self) -> Option<(PathBuf, bool)> {
        if let Some(path) = &self.cli_config_path {
            return Some((path.clone(), true));
        }
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.trim().is_empty() {
                return Some((PathBuf::from(path), true));
            }
        }
        default_config_path().map(|p| (p, false))
    }

    /// Build the effective configuration
    ///
    /// An explicitly requested config file that cannot be read is an error;
    /// a missing file at the default location falls back to defaults.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match self.config_path() {
            Some((path, _)) if path.exists() => {
                info!("Loading config from {}", path.display());
                load_toml_config(&path)?
            }
            Some((path, true)) => {
                return Err(Error::ConfigNotFound(path));
            }
            Some((path, false)) => {
                warn!(
                    "No config file at {}, using compiled defaults",
                    path.display()
                );
                TomlConfig::default()
            }
            None => {
                warn!("Could not determine config directory, using compiled defaults");
                TomlConfig::default()
            }
        };

        if let Some(url) = &self.cli_service_url {
            config.service.base_url = url.clone();
        } else if let Ok(url) = std::env::var(SERVICE_URL_ENV) {
            if !url.trim().is_empty() {
                info!("Service URL taken from {}", SERVICE_URL_ENV);
                config.service.base_url = url;
            }
        }

        config.validate()?;
        Ok(config)
    }
}
