//! Ordered lookup tables for cover discovery.
//!
//! Reordering or adding a heuristic is a change to these tables only; the
//! static extractor and the in-page script each walk them in a single loop.

use crate::cover::Heuristic;
use serde::Serialize;

/// One step of the static markup lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// First non-empty `attr` among elements matching `selector`.
    Attribute { selector: &'static str, attr: &'static str },

    /// `application/ld+json` blocks. On an object payload the first usable
    /// entry of `fields` wins; on an array payload, `array_fields` of its
    /// first element.
    StructuredData { fields: &'static [&'static str], array_fields: &'static [&'static str] },

    /// First element matching `selector`, read through [`IMAGE_SOURCES`].
    Image { selector: &'static str },
}

impl Rule {
    pub fn heuristic(&self) -> Heuristic {
        match self {
            Rule::Attribute { .. } => Heuristic::MetaTag,
            Rule::StructuredData { .. } => Heuristic::StructuredData,
            Rule::Image { .. } => Heuristic::ImageSelector,
        }
    }

    /// Selector string the rule is evaluated with.
    pub fn selector(&self) -> &'static str {
        match self {
            Rule::Attribute { selector, .. } | Rule::Image { selector } => *selector,
            Rule::StructuredData { .. } => LD_JSON_SELECTOR,
        }
    }
}

pub const LD_JSON_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

/// Static lookup order, highest priority first.
pub const MARKUP_RULES: &[Rule] = &[
    Rule::Attribute { selector: r#"meta[property="og:image"]"#, attr: "content" },
    Rule::Attribute { selector: r#"meta[property="og:image:url"]"#, attr: "content" },
    Rule::Attribute { selector: r#"meta[name="og:image"]"#, attr: "content" },
    Rule::Attribute { selector: r#"meta[name="og:image:url"]"#, attr: "content" },
    Rule::Attribute { selector: r#"meta[name="twitter:image"]"#, attr: "content" },
    Rule::Attribute { selector: r#"meta[name="twitter:image:src"]"#, attr: "content" },
    Rule::Attribute { selector: r#"link[rel="image_src"]"#, attr: "href" },
    Rule::StructuredData { fields: &["image", "thumbnailUrl"], array_fields: &["image"] },
    Rule::Image { selector: "img[class*=cover], img[id*=cover]" },
    Rule::Image { selector: "img[class*=thumb], img[id*=thumb]" },
    Rule::Image { selector: "img[data-src]" },
    Rule::Image { selector: "img[srcset]" },
    Rule::Image { selector: "img" },
];

/// Where an `<img>` keeps its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// A single URL attribute.
    Plain(&'static str),
    /// A srcset-style list; the first candidate is used.
    Srcset(&'static str),
}

/// Attribute preference for a matched `<img>`.
pub const IMAGE_SOURCES: &[ImageSource] = &[
    ImageSource::Plain("src"),
    ImageSource::Plain("data-src"),
    ImageSource::Srcset("data-srcset"),
    ImageSource::Srcset("srcset"),
];

/// Keys inside an `ImageObject` that hold its address.
pub const IMAGE_OBJECT_FIELDS: &[&str] = &["url", "contentUrl"];

/// One step of the in-page lookup run by the headless browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DomProbe {
    pub selector: &'static str,
    /// Attributes read in order; the first non-empty wins.
    pub attrs: &'static [&'static str],
    /// Skip inline `data:` values (lazy-load placeholders on `<img>`).
    pub skip_inline: bool,
}

/// Rendered lookup order, highest priority first.
pub const DOM_PROBES: &[DomProbe] = &[
    DomProbe { selector: r#"meta[property="og:image"]"#, attrs: &["content"], skip_inline: false },
    DomProbe { selector: r#"meta[name="twitter:image"]"#, attrs: &["content"], skip_inline: false },
    DomProbe { selector: r#"link[rel="image_src"]"#, attrs: &["href"], skip_inline: false },
    DomProbe {
        selector: "img[class*=cover], img[class*=thumb], img[id*=cover], img[id*=thumb]",
        attrs: &["data-src", "src"],
        skip_inline: true,
    },
    DomProbe { selector: "img", attrs: &["data-src", "src"], skip_inline: true },
];

/// First URL of a srcset list: `"a.jpg 1x, b.jpg 2x"` gives `"a.jpg"`.
pub fn first_srcset_candidate(value: &str) -> Option<&str> {
    value
        .split(',')
        .next()
        .and_then(|entry| entry.split_whitespace().next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Whether a declared image value (meta, link, ld+json) is present.
pub fn has_content(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Whether an `<img>` attribute value can stand for a real image.
///
/// Inline `data:` URIs are lazy-loading placeholders, never covers.
pub fn is_usable_reference(value: &str) -> bool {
    let v = value.trim();
    !v.is_empty() && !v.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("data:"))
}
