//! Cover resolution: static fetch first, headless render as fallback.
//!
//! ### Stages
//! 1. **Static**: fetch markup and run the extractor. A hit returns
//!    immediately; the renderer is never touched.
//! 2. **Gate**: without `allow_rendered_fallback` (or without a renderer)
//!    resolution ends with no cover.
//! 3. **Rendered**: load the page in a headless browser and query the DOM.
//!
//! Every failure is logged with its URL and stage and becomes a miss.
//! [`CoverPipeline::resolve_cover`] cannot fail; `None` tells the caller to
//! keep its placeholder.

use crate::cover::ExtractedCover;
use crate::extract::{CoverExtractor, MarkupCoverExtractor};
use crate::fetch::{FetchConfig, PageFetcher, StaticFetcher, canonicalize};
use crate::render::CoverRenderer;
use coverscout_core::{AppConfig, Error};
use std::sync::Arc;
use url::Url;

/// Per-call switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Permit the costly headless-browser stage. Off by default.
    pub allow_rendered_fallback: bool,
}

impl ResolveOptions {
    pub fn with_rendered_fallback() -> Self {
        Self { allow_rendered_fallback: true }
    }
}

impl From<&AppConfig> for ResolveOptions {
    fn from(config: &AppConfig) -> Self {
        Self { allow_rendered_fallback: config.render_enabled }
    }
}

/// Result of a single stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The stage produced a cover.
    Found(ExtractedCover),
    /// The stage ran (or failed) without producing a cover.
    Miss,
    /// The stage was not allowed to run.
    Disabled,
}

impl StageOutcome {
    pub fn into_cover(self) -> Option<ExtractedCover> {
        match self {
            StageOutcome::Found(cover) => Some(cover),
            StageOutcome::Miss | StageOutcome::Disabled => None,
        }
    }
}

/// Orchestrates fetcher, extractor, and optional renderer.
#[derive(Clone)]
pub struct CoverPipeline {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn CoverExtractor>,
    renderer: Option<Arc<dyn CoverRenderer>>,
}

impl CoverPipeline {
    /// Pipeline without a renderer; the rendered stage is always `Disabled`.
    pub fn new(fetcher: Arc<dyn PageFetcher>, extractor: Arc<dyn CoverExtractor>) -> Self {
        Self { fetcher, extractor, renderer: None }
    }

    /// Attach the headless fallback.
    pub fn with_renderer(mut self, renderer: Arc<dyn CoverRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Build the production pipeline from configuration.
    ///
    /// The headless renderer is attached when the `render` feature is enabled.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let fetcher = StaticFetcher::new(FetchConfig::from(config))?;
        let pipeline = Self::new(Arc::new(fetcher), Arc::new(MarkupCoverExtractor::new()));

        #[cfg(feature = "render")]
        let pipeline = pipeline.with_renderer(Arc::new(crate::render::HeadlessRenderer::new(
            crate::render::RenderOptions::from(config),
        )));

        Ok(pipeline)
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    /// Resolve the cover URL for `url`, or `None` to use a placeholder.
    pub async fn resolve_cover(&self, url: &str, options: ResolveOptions) -> Option<String> {
        self.resolve(url, options).await.map(|found| found.cover.into_url())
    }

    /// Like [`CoverPipeline::resolve_cover`], keeping the matched candidate.
    pub async fn resolve(&self, url: &str, options: ResolveOptions) -> Option<ExtractedCover> {
        let target = match canonicalize(url) {
            Ok(u) => u,
            Err(e) => {
                let err = Error::from(e);
                tracing::warn!(url, stage = "canonicalize", code = err.code(), "cover resolution skipped: {err}");
                return None;
            }
        };

        if let Some(cover) = self.static_stage(&target).await.into_cover() {
            return Some(cover);
        }

        match self.rendered_stage(&target, options).await {
            StageOutcome::Found(cover) => Some(cover),
            StageOutcome::Miss => {
                tracing::info!(url = %target, "no cover found");
                None
            }
            StageOutcome::Disabled => {
                tracing::debug!(url = %target, "no cover found by static stage; rendered fallback not allowed");
                None
            }
        }
    }

    /// Stage 1: fetch markup and extract.
    pub async fn static_stage(&self, url: &Url) -> StageOutcome {
        let response = match self.fetcher.fetch(url.as_str()).await {
            Ok(r) => r,
            Err(e) => {
                absorb(url, "static", &e);
                return StageOutcome::Miss;
            }
        };

        match self.extractor.extract(&response.body, response.final_url.as_str()) {
            Some(cover) => {
                tracing::info!(
                    url = %url,
                    stage = "static",
                    heuristic = %cover.candidate.source_heuristic,
                    cover = %cover.cover.absolute_url,
                    "cover found"
                );
                StageOutcome::Found(cover)
            }
            None => {
                tracing::debug!(url = %url, stage = "static", fetch_ms = response.fetch_ms, "no cover in markup");
                StageOutcome::Miss
            }
        }
    }

    /// Stages 2 and 3: gate, then render.
    pub async fn rendered_stage(&self, url: &Url, options: ResolveOptions) -> StageOutcome {
        if !options.allow_rendered_fallback {
            return StageOutcome::Disabled;
        }

        let Some(renderer) = &self.renderer else {
            let err = Error::RenderDisabled;
            tracing::warn!(url = %url, stage = "rendered", code = err.code(), "fallback requested: {err}");
            return StageOutcome::Disabled;
        };

        tracing::info!(url = %url, stage = "rendered", "using headless fallback");

        match renderer.render_cover(url).await {
            Ok(Some(cover)) => {
                tracing::info!(url = %url, stage = "rendered", cover = %cover.cover.absolute_url, "cover found");
                StageOutcome::Found(cover)
            }
            Ok(None) => StageOutcome::Miss,
            Err(e) => {
                absorb(url, "rendered", &Error::from(e));
                StageOutcome::Miss
            }
        }
    }
}

/// Log a stage failure that resolution folds into a miss.
///
/// Failures caused by the site are warnings; anything else points at our own
/// setup and is logged as an error.
fn absorb(url: &Url, stage: &'static str, err: &Error) {
    if err.is_stage_miss() {
        tracing::warn!(url = %url, stage, code = err.code(), "stage failed: {err}");
    } else {
        tracing::error!(url = %url, stage, code = err.code(), "stage failed on misconfiguration: {err}");
    }
}
