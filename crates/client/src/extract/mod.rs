//! Cover discovery in fetched markup.
//!
//! ### Lookup Order
//! 1. Open Graph and Twitter meta tags, then `<link rel="image_src">`.
//! 2. `application/ld+json` blocks (`image`, `thumbnailUrl`).
//! 3. `<img>` selectors: cover, thumb, `data-src`, `srcset`, any image.
//!
//! The order lives in [`heuristics::MARKUP_RULES`]; the extractor parses the
//! document once and stops at the first rule that yields a reference. Every
//! reference is resolved against the page URL before it is returned.
//!
//! Extraction is pure: no network access and no failure mode beyond "no
//! cover". A malformed structured-data block only disqualifies itself.

pub mod heuristics;

pub use heuristics::{DOM_PROBES, DomProbe, MARKUP_RULES, Rule};

use crate::cover::ExtractedCover;
use heuristics::{
    IMAGE_OBJECT_FIELDS, IMAGE_SOURCES, ImageSource, first_srcset_candidate, has_content, is_usable_reference,
};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

/// Cover extraction over raw markup.
///
/// This allows swapping the extraction strategy without touching the pipeline.
pub trait CoverExtractor: Send + Sync {
    /// Find the best cover reference in `markup`, resolved against `base_url`.
    fn extract(&self, markup: &str, base_url: &str) -> Option<ExtractedCover>;
}

struct CompiledRule {
    rule: Rule,
    selector: Selector,
}

/// Table-driven extractor using `scraper`.
pub struct MarkupCoverExtractor {
    rules: Vec<CompiledRule>,
}

impl MarkupCoverExtractor {
    /// Create an extractor over the default [`MARKUP_RULES`].
    pub fn new() -> Self {
        Self::with_rules(MARKUP_RULES)
    }

    /// Create an extractor over a custom rule table.
    ///
    /// Rules whose selector does not parse are dropped with a warning.
    pub fn with_rules(rules: &[Rule]) -> Self {
        let rules = rules
            .iter()
            .filter_map(|rule| match Selector::parse(rule.selector()) {
                Ok(selector) => Some(CompiledRule { rule: *rule, selector }),
                Err(e) => {
                    tracing::warn!(selector = rule.selector(), "dropping cover rule: {e}");
                    None
                }
            })
            .collect();

        Self { rules }
    }
}

impl Default for MarkupCoverExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverExtractor for MarkupCoverExtractor {
    fn extract(&self, markup: &str, base_url: &str) -> Option<ExtractedCover> {
        let document = Html::parse_document(markup);

        for compiled in &self.rules {
            let found = match compiled.rule {
                Rule::Attribute { attr, .. } => first_attribute(&document, &compiled.selector, attr),
                Rule::StructuredData { fields, array_fields } => {
                    structured_data_image(&document, &compiled.selector, fields, array_fields)
                }
                Rule::Image { .. } => document.select(&compiled.selector).next().and_then(image_reference),
            };

            match found {
                Some(raw) => {
                    let heuristic = compiled.rule.heuristic();
                    tracing::debug!(%heuristic, selector = compiled.rule.selector(), raw = %raw, "cover candidate");
                    return Some(ExtractedCover::new(raw, heuristic, base_url));
                }
                None => {
                    tracing::debug!(heuristic = %compiled.rule.heuristic(), selector = compiled.rule.selector(), "no match")
                }
            }
        }

        None
    }
}

/// Extract a cover with the default extractor.
pub fn extract_cover(markup: &str, base_url: &str) -> Option<ExtractedCover> {
    MarkupCoverExtractor::new().extract(markup, base_url)
}

fn first_attribute(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
    document
        .select(selector)
        .filter_map(|el| el.value().attr(attr))
        .find(|v| has_content(v))
        .map(|v| v.trim().to_string())
}

/// Read an `<img>` through the attribute preference list.
fn image_reference(element: ElementRef<'_>) -> Option<String> {
    IMAGE_SOURCES.iter().find_map(|source| {
        let value = match *source {
            ImageSource::Plain(attr) => element.value().attr(attr).map(str::trim),
            ImageSource::Srcset(attr) => element.value().attr(attr).and_then(first_srcset_candidate),
        }?;
        is_usable_reference(value).then(|| value.to_string())
    })
}

fn structured_data_image(
    document: &Html, selector: &Selector, fields: &[&str], array_fields: &[&str],
) -> Option<String> {
    document.select(selector).enumerate().find_map(|(index, block)| {
        let raw = block.text().collect::<String>();
        let payload: Value = match serde_json::from_str(raw.trim()) {
            Ok(v) => v,
            Err(e) => {
                let err = coverscout_core::Error::Parse(format!("ld+json block {index}: {e}"));
                tracing::debug!("skipping structured data: {err}");
                return None;
            }
        };

        match &payload {
            Value::Array(items) => items.first().and_then(|first| field_reference(first, array_fields)),
            _ => field_reference(&payload, fields),
        }
    })
}

fn field_reference(value: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| value.get(*field).and_then(value_reference))
}

/// Reduce an `image`-like JSON value to a single reference.
///
/// Strings are used directly, arrays contribute their first element, and
/// `ImageObject`s their `url` or `contentUrl`.
fn value_reference(value: &Value) -> Option<String> {
    let value = match value {
        Value::Array(items) => items.first()?,
        other => other,
    };

    let reference = match value {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => IMAGE_OBJECT_FIELDS.iter().find_map(|k| obj.get(*k).and_then(Value::as_str))?,
        _ => return None,
    };

    has_content(reference).then(|| reference.trim().to_string())
}
