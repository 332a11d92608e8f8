//! Configuration
//!
//! Client settings with a TOML file at `~/.config/fear-greed/config.toml`.
//!
//! # Configuration Priority
//!
//! Values are applied with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`], applied by the binaries)
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! base_url = "http://127.0.0.1:5000"
//! request_timeout_secs = 15
//!
//! [refresh]
//! interval_secs = 300
//! drop_stale_responses = false
//!
//! [display]
//! locale = "ko"
//! ```
//!
//! # Environment Variables
//!
//! - `FEAR_GREED_API_URL`: base URL of the index service
//! - `FEAR_GREED_REFRESH_SECS`: refresh interval in seconds
//! - `FEAR_GREED_TIMEOUT_SECS`: request timeout in seconds
//! - `FEAR_GREED_DROP_STALE`: "1"/"true" to discard out-of-order responses
//! - `FEAR_GREED_LOCALE`: "en" or "ko"

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::Locale;

/// Default index service address
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
/// Default refresh period (5 minutes)
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);
/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Highest-priority layer that contributed a value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[api]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiToml {
    /// Base URL of the index service
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

/// `[refresh]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshToml {
    /// Refresh interval in seconds
    pub interval_secs: Option<u64>,
    /// Discard responses that resolve after a newer one
    pub drop_stale_responses: Option<bool>,
}

/// `[display]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayToml {
    /// Label language ("en" or "ko")
    pub locale: Option<Locale>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FearGreedToml {
    /// API section
    pub api: ApiToml,
    /// Refresh section
    pub refresh: RefreshToml,
    /// Display section
    pub display: DisplayToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved client configuration
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the index service (no trailing slash)
    pub base_url: String,
    /// Period between scheduled refreshes
    pub refresh_interval: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Discard responses older than the latest applied one
    pub drop_stale_responses: bool,
    /// Label language
    pub locale: Locale,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    source: ConfigSource,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            drop_stale_responses: false,
            locale: Locale::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ClientConfig {
    /// Defaults pointed at a specific base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Check value ranges and the URL
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| {
            ConfigError::ValidationError(format!("base_url '{}': {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "base_url '{}' must use http or https",
                self.base_url
            )));
        }
        if self.refresh_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "refresh interval must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Command-line overrides, applied on top of file and environment
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// `--api-url`
    pub base_url: Option<String>,
    /// `--interval-secs`
    pub refresh_interval: Option<Duration>,
    /// `--timeout-secs`
    pub request_timeout: Option<Duration>,
    /// `--drop-stale`
    pub drop_stale_responses: Option<bool>,
    /// `--locale`
    pub locale: Option<Locale>,
}

impl ConfigOverrides {
    /// Apply overrides and re-validate
    ///
    /// # Errors
    ///
    /// Returns a validation error if an override is out of range.
    pub fn apply(self, config: &mut ClientConfig) -> Result<(), ConfigError> {
        let mut touched = false;
        if let Some(url) = self.base_url {
            config.base_url = normalize_base_url(&url);
            touched = true;
        }
        if let Some(interval) = self.refresh_interval {
            config.refresh_interval = interval;
            touched = true;
        }
        if let Some(timeout) = self.request_timeout {
            config.request_timeout = timeout;
            touched = true;
        }
        if let Some(drop_stale) = self.drop_stale_responses {
            config.drop_stale_responses = drop_stale;
            touched = true;
        }
        if let Some(locale) = self.locale {
            config.locale = locale;
            touched = true;
        }
        if touched {
            config.source = ConfigSource::Cli;
        }
        config.validate()
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/fear-greed/config.toml` or
/// `~/.config/fear-greed/config.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("fear-greed").join("config.toml"))
}

/// Load configuration from the default file and the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// resulting values fail validation. A missing file is not an error.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ClientConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with an explicit environment lookup
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ClientConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: FearGreedToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env)?;
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ClientConfig, toml: &FearGreedToml) {
    if let Some(ref url) = toml.api.base_url {
        config.base_url = normalize_base_url(url);
    }
    if let Some(secs) = toml.api.request_timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = toml.refresh.interval_secs {
        config.refresh_interval = Duration::from_secs(secs);
    }
    if let Some(drop_stale) = toml.refresh.drop_stale_responses {
        config.drop_stale_responses = drop_stale;
    }
    if let Some(locale) = toml.display.locale {
        config.locale = locale;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut ClientConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env("FEAR_GREED_API_URL").filter(|v| !v.trim().is_empty()) {
        config.base_url = normalize_base_url(&url);
        config.source = ConfigSource::Env;
    }
    if let Some(secs) = env("FEAR_GREED_REFRESH_SECS") {
        config.refresh_interval = Duration::from_secs(parse_secs("FEAR_GREED_REFRESH_SECS", &secs)?);
        config.source = ConfigSource::Env;
    }
    if let Some(secs) = env("FEAR_GREED_TIMEOUT_SECS") {
        config.request_timeout = Duration::from_secs(parse_secs("FEAR_GREED_TIMEOUT_SECS", &secs)?);
        config.source = ConfigSource::Env;
    }
    if let Some(flag) = env("FEAR_GREED_DROP_STALE") {
        config.drop_stale_responses = flag == "1" || flag.eq_ignore_ascii_case("true");
        config.source = ConfigSource::Env;
    }
    if let Some(locale) = env("FEAR_GREED_LOCALE") {
        config.locale = locale
            .parse()
            .map_err(|e| ConfigError::ValidationError(format!("FEAR_GREED_LOCALE: {e}")))?;
        config.source = ConfigSource::Env;
    }
    Ok(())
}

fn parse_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("{key}: '{value}' is not a number of seconds")))
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
