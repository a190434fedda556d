//! Value types flowing through cover resolution.

use serde::Serialize;
use std::fmt;

/// Which lookup produced a cover candidate. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// Open Graph / Twitter meta tags and the `image_src` link hint.
    MetaTag,
    /// An `application/ld+json` block.
    StructuredData,
    /// An `<img>` element picked by selector.
    ImageSelector,
    /// The in-page query run by the headless browser.
    DomQuery,
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Heuristic::MetaTag => "meta_tag",
            Heuristic::StructuredData => "structured_data",
            Heuristic::ImageSelector => "image_selector",
            Heuristic::DomQuery => "dom_query",
        };
        f.write_str(name)
    }
}

/// A raw image reference captured from markup or a live DOM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverCandidate {
    /// The reference exactly as found, possibly relative.
    pub raw_reference: String,
    /// The heuristic that matched.
    pub source_heuristic: Heuristic,
}

/// The pipeline's final answer: a best-effort absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCover {
    pub absolute_url: String,
}

impl ResolvedCover {
    pub fn into_url(self) -> String {
        self.absolute_url
    }
}

/// A candidate together with its resolved form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedCover {
    pub candidate: CoverCandidate,
    pub cover: ResolvedCover,
}

impl ExtractedCover {
    /// Resolve `raw_reference` against `base_url` and pair the two.
    pub fn new(raw_reference: String, source_heuristic: Heuristic, base_url: &str) -> Self {
        let absolute_url = crate::resolve::resolve(&raw_reference, base_url);
        Self { candidate: CoverCandidate { raw_reference, source_heuristic }, cover: ResolvedCover { absolute_url } }
    }
}
