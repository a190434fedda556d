//! Best-effort resolution of image references against a page URL.
//!
//! Resolution never fails: a reference that cannot be joined with its base
//! is returned unchanged so an odd edge case never blocks the pipeline.

use url::Url;

/// Resolve `reference` against `base_url` using standard URL-join rules.
///
/// Scheme-relative (`//cdn/x.png`), path-relative (`../x.png`) and
/// query-relative (`?page=2`) references are all supported. If `base_url`
/// does not parse, or the join fails, `reference` is returned as-is.
pub fn resolve(reference: &str, base_url: &str) -> String {
    match Url::parse(base_url) {
        Ok(base) => resolve_against(reference, &base),
        Err(e) => match Url::parse(reference) {
            Ok(absolute) => absolute.to_string(),
            Err(_) => {
                tracing::debug!(reference, base_url, "unparseable base URL: {e}");
                reference.to_string()
            }
        },
    }
}

/// Like [`resolve`], for callers that already hold a parsed base.
pub fn resolve_against(reference: &str, base: &Url) -> String {
    match base.join(reference) {
        Ok(u) => u.to_string(),
        Err(e) => {
            tracing::debug!(reference, base = %base, "reference kept verbatim: {e}");
            reference.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://site.test/manga/1";

    #[test]
    fn test_resolve_root_relative() {
        assert_eq!(resolve("/covers/a.jpg", BASE), "https://site.test/covers/a.jpg");
    }

    #[test]
    fn test_resolve_path_relative() {
        assert_eq!(resolve("a.jpg", BASE), "https://site.test/manga/a.jpg");
        assert_eq!(resolve("../img/a.jpg", "https://site.test/manga/1/"), "https://site.test/manga/img/a.jpg");
    }

    #[test]
    fn test_resolve_scheme_relative() {
        assert_eq!(resolve("//cdn.test/x.png", BASE), "https://cdn.test/x.png");
        assert_eq!(resolve("//cdn.test/x.png", "http://site.test/"), "http://cdn.test/x.png");
    }

    #[test]
    fn test_resolve_query_relative() {
        assert_eq!(resolve("?size=large", BASE), "https://site.test/manga/1?size=large");
    }

    #[test]
    fn test_resolve_absolute_passthrough() {
        assert_eq!(resolve("https://cdn.test/x.png?w=300&h=420", BASE), "https://cdn.test/x.png?w=300&h=420");
    }

    #[test]
    fn test_resolve_invalid_base_keeps_reference() {
        assert_eq!(resolve("/covers/a.jpg", "not a base"), "/covers/a.jpg");
    }

    #[test]
    fn test_resolve_invalid_base_absolute_reference() {
        assert_eq!(resolve("https://cdn.test/x.png", ""), "https://cdn.test/x.png");
    }

    #[test]
    fn test_resolve_unjoinable_reference_kept() {
        let reference = "https://exa mple.com/x.png";
        assert_eq!(resolve(reference, BASE), reference);
    }

    #[test]
    fn test_resolve_against_parsed_base() {
        let base = Url::parse(BASE).unwrap();
        assert_eq!(resolve_against("/c.png", &base), "https://site.test/c.png");
    }
}
