//! Cover discovery for manga entries.
//!
//! Given a series' website, find a representative cover image URL: read
//! static markup with a fixed heuristic order, and optionally fall back to a
//! headless browser for pages that build their DOM with scripts.
//!
//! ### Layout
//! - [`fetch`]: HTTP retrieval with browser-like headers and limits
//! - [`extract`]: ordered markup heuristics
//! - [`render`]: headless fallback (real browser behind the `render` feature)
//! - [`pipeline`]: the two-stage resolver that never fails
//! - [`refresh`]: fire-and-forget cover updates

pub mod cover;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod refresh;
pub mod render;
pub mod resolve;

pub use cover::{CoverCandidate, ExtractedCover, Heuristic, ResolvedCover};
pub use extract::{CoverExtractor, MarkupCoverExtractor, extract_cover};
pub use fetch::{FetchConfig, FetchResponse, PageFetcher, StaticFetcher, canonicalize};
pub use pipeline::{CoverPipeline, ResolveOptions, StageOutcome};
pub use refresh::spawn_cover_refresh;
#[cfg(feature = "render")]
pub use render::HeadlessRenderer;
pub use render::{CoverRenderer, RenderError, RenderOptions};
pub use resolve::resolve;
