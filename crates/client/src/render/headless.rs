//! chromiumoxide-backed renderer.
//!
//! Each call launches its own browser with a throwaway profile directory and
//! tears it down before returning, so a hung page never outlives its call.

use super::{CoverRenderer, IdleTracker, RESOURCE_COUNT_JS, RenderError, RenderOptions, probe_script};
use crate::cover::{ExtractedCover, Heuristic};
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures_util::StreamExt;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use url::Url;

/// Headless Chrome/Chromium renderer, one isolated browser per call.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    options: RenderOptions,
}

impl HeadlessRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}

#[async_trait::async_trait]
impl CoverRenderer for HeadlessRenderer {
    async fn render_cover(&self, url: &Url) -> Result<Option<ExtractedCover>, RenderError> {
        let start = Instant::now();
        let mut session = BrowserSession::launch(&self.options).await?;

        let outcome = session.find_cover(url, &self.options).await;
        session.close().await;

        tracing::debug!(url = %url, elapsed_ms = start.elapsed().as_millis() as u64, "render finished");
        outcome
    }
}

/// A launched browser plus its CDP event loop.
///
/// Release happens in [`BrowserSession::close`]; if the session is dropped
/// without it (cancellation, panic) the handler task is aborted and
/// chromiumoxide kills the child process when `Browser` drops.
struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    closed: bool,
    _profile: tempfile::TempDir,
}

impl BrowserSession {
    async fn launch(opts: &RenderOptions) -> Result<Self, RenderError> {
        let profile = tempfile::Builder::new()
            .prefix("coverscout-profile-")
            .tempdir()
            .map_err(|e| RenderError::BrowserLaunch(format!("profile dir: {e}")))?;

        let (width, height) = opts.viewport;
        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile.path())
            .request_timeout(opts.timeout)
            .window_size(width, height)
            .arg(format!("--user-agent={}", opts.user_agent))
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .arg("--mute-audio");

        if opts.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &opts.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(RenderError::BrowserLaunch)?;

        let (browser, mut handler) =
            Browser::launch(config).await.map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                }
            }
        });

        Ok(Self { browser, handler, closed: false, _profile: profile })
    }

    async fn find_cover(&self, url: &Url, opts: &RenderOptions) -> Result<Option<ExtractedCover>, RenderError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        let loaded = tokio::time::timeout(opts.timeout, async {
            page.goto(url.as_str())
                .await
                .map_err(|e| RenderError::Navigation(e.to_string()))?;
            wait_for_network_idle(&page, opts).await;
            Ok::<(), RenderError>(())
        })
        .await;

        let result = match loaded {
            Ok(Ok(())) => query_cover(&page, url).await,
            Ok(Err(e)) => Err(e),
            Err(_) => Err(RenderError::Timeout(opts.timeout.as_millis() as u64)),
        };

        page.close().await.ok();
        result
    }

    async fn close(&mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("failed to close browser: {e}");
        }
        self.handler.abort();
        self.closed = true;
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!("browser session dropped before close; killing browser");
            self.handler.abort();
        }
    }
}

/// Poll the page's resource count until it stops changing.
async fn wait_for_network_idle(page: &Page, opts: &RenderOptions) {
    let mut tracker = IdleTracker::new(opts.idle_window);
    let mut last_poll = Instant::now();

    loop {
        let count = match page.evaluate(RESOURCE_COUNT_JS).await {
            Ok(result) => result.into_value::<i64>().ok(),
            Err(e) => {
                tracing::trace!("resource count probe failed: {e}");
                None
            }
        };

        if tracker.observe(count, last_poll.elapsed()) {
            return;
        }
        last_poll = Instant::now();
        tokio::time::sleep(opts.poll_interval.max(Duration::from_millis(10))).await;
    }
}

async fn query_cover(page: &Page, requested: &Url) -> Result<Option<ExtractedCover>, RenderError> {
    let reference: String = page
        .evaluate(probe_script())
        .await
        .map_err(|e| RenderError::Evaluation(e.to_string()))?
        .into_value()
        .map_err(|e| RenderError::Evaluation(e.to_string()))?;

    if reference.is_empty() {
        return Ok(None);
    }

    let base = match page.url().await {
        Ok(Some(current)) => current,
        _ => requested.to_string(),
    };

    Ok(Some(ExtractedCover::new(reference, Heuristic::DomQuery, &base)))
}
