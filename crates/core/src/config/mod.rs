//! Application configuration with layered loading.
//!
//! Configuration is loaded with figment from multiple sources:
//!
//! 1. Environment variables (COVERSCOUT_*)
//! 2. TOML config file (if COVERSCOUT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Desktop browser User-Agent shared by the static and rendered paths.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0 Safari/537.36";

/// Accept header sent with the static fetch.
pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (COVERSCOUT_*)
/// 2. TOML config file (if COVERSCOUT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// User-Agent string for both the static fetch and the headless browser.
    ///
    /// Set via COVERSCOUT_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept header for the static fetch.
    #[serde(default = "default_accept")]
    pub accept: String,

    /// Accept-Language header for the static fetch.
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Referer header for the static fetch.
    #[serde(default = "default_referer")]
    pub referer: String,

    /// Static fetch timeout in milliseconds.
    ///
    /// Set via COVERSCOUT_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirect hops for the static fetch.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Maximum response body size in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Headless navigation timeout in milliseconds.
    ///
    /// Set via COVERSCOUT_RENDER_TIMEOUT_MS environment variable.
    #[serde(default = "default_render_timeout_ms")]
    pub render_timeout_ms: u64,

    /// Whether the rendered fallback is allowed when the caller does not say.
    ///
    /// Set via COVERSCOUT_RENDER_ENABLED environment variable.
    #[serde(default)]
    pub render_enabled: bool,

    /// Explicit Chromium binary; auto-detected when unset.
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,

    /// Launch Chromium with `--no-sandbox` (needed when running as root in containers).
    #[serde(default)]
    pub render_no_sandbox: bool,

    /// Base URL for generated placeholder covers.
    #[serde(default = "default_placeholder_base")]
    pub placeholder_base: String,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}

fn default_accept() -> String {
    DEFAULT_ACCEPT.into()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".into()
}

fn default_referer() -> String {
    "https://google.com/".into()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_max_redirects() -> usize {
    10
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_render_timeout_ms() -> u64 {
    20_000
}

fn default_placeholder_base() -> String {
    "https://placehold.co/300x420".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept: default_accept(),
            accept_language: default_accept_language(),
            referer: default_referer(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            max_bytes: default_max_bytes(),
            render_timeout_ms: default_render_timeout_ms(),
            render_enabled: false,
            chrome_executable: None,
            render_no_sandbox: false,
            placeholder_base: default_placeholder_base(),
        }
    }
}

impl AppConfig {
    /// Static fetch timeout as Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Headless navigation timeout as Duration.
    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// The layered figment used by [`AppConfig::load`].
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("COVERSCOUT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(Env::prefixed("COVERSCOUT_").map(|key| key.as_str().to_lowercase().into()))
    }

    /// Extract and validate a config from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
