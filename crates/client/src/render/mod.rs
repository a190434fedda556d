//! Headless browser fallback for pages that build their DOM client-side.
//!
//! The [`CoverRenderer`] trait is always available; the chromiumoxide-backed
//! [`HeadlessRenderer`] is gated behind the `render` feature.

#[cfg(feature = "render")]
mod headless;

#[cfg(feature = "render")]
pub use headless::HeadlessRenderer;

use crate::cover::ExtractedCover;
use crate::extract::DOM_PROBES;
use coverscout_core::AppConfig;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during the rendered stage.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failed to launch or configure the browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Failed to navigate to URL.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The in-page cover query failed.
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// Timeout waiting for page to load.
    #[error("render timeout after {0}ms")]
    Timeout(u64),
}

impl From<RenderError> for coverscout_core::Error {
    fn from(err: RenderError) -> Self {
        coverscout_core::Error::RenderFailed(err.to_string())
    }
}

/// Options for the rendered stage.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Navigation timeout, including the network-idle wait (default: 20s).
    pub timeout: Duration,

    /// User-Agent presented by the browser.
    pub user_agent: String,

    /// Explicit Chromium binary; auto-detected when `None`.
    pub chrome_executable: Option<PathBuf>,

    /// Pass `--no-sandbox` to Chromium.
    pub no_sandbox: bool,

    /// How long the resource count must stay unchanged to call the network idle.
    pub idle_window: Duration,

    /// Interval between idle checks.
    pub poll_interval: Duration,

    /// Viewport dimensions (default: 1280x720).
    pub viewport: (u32, u32),
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for RenderOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout: config.render_timeout(),
            user_agent: config.user_agent.clone(),
            chrome_executable: config.chrome_executable.clone(),
            no_sandbox: config.render_no_sandbox,
            idle_window: Duration::from_millis(500),
            poll_interval: Duration::from_millis(250),
            viewport: (1280, 720),
        }
    }
}

/// Renderer trait for the headless fallback.
#[async_trait::async_trait]
pub trait CoverRenderer: Send + Sync {
    /// Load `url` in a browser and run the in-page cover query.
    ///
    /// `Ok(None)` means the page loaded but nothing matched.
    async fn render_cover(&self, url: &Url) -> Result<Option<ExtractedCover>, RenderError>;
}

const PROBE_FN: &str = r#"function (probes) {
  for (const probe of probes) {
    const el = document.querySelector(probe.selector);
    if (!el) continue;
    for (const attr of probe.attrs) {
      const value = (el.getAttribute(attr) || "").trim();
      if (!value || (probe.skip_inline && /^data:/i.test(value))) continue;
      try {
        return new URL(value, document.baseURI).href;
      } catch (_) {
        return value;
      }
    }
  }
  return "";
}"#;

/// Resource-timing count once the document has loaded, -1 before.
#[cfg_attr(not(feature = "render"), allow(dead_code))]
pub(crate) const RESOURCE_COUNT_JS: &str =
    "document.readyState === 'complete' ? performance.getEntriesByType('resource').length : -1";

/// In-page script walking [`DOM_PROBES`].
///
/// Evaluates to the first absolute reference found, or `""` when nothing matched.
pub fn probe_script() -> String {
    let probes = serde_json::to_string(DOM_PROBES).unwrap_or_else(|_| "[]".to_string());
    format!("({PROBE_FN})({probes})")
}

/// Tracks whether a sequence of resource counts has settled.
#[derive(Debug)]
#[cfg_attr(not(feature = "render"), allow(dead_code))]
pub(crate) struct IdleTracker {
    window: Duration,
    last: Option<i64>,
    stable_for: Duration,
}

#[cfg_attr(not(feature = "render"), allow(dead_code))]
impl IdleTracker {
    pub(crate) fn new(window: Duration) -> Self {
        Self { window, last: None, stable_for: Duration::ZERO }
    }

    /// Record a sample taken `elapsed` after the previous one.
    ///
    /// Returns true once the count has been unchanged for the idle window.
    pub(crate) fn observe(&mut self, count: Option<i64>, elapsed: Duration) -> bool {
        match count {
            Some(c) if c >= 0 && self.last == Some(c) => self.stable_for += elapsed,
            other => {
                self.last = other.filter(|c| *c >= 0);
                self.stable_for = Duration::ZERO;
            }
        }
        self.stable_for >= self.window
    }
}
