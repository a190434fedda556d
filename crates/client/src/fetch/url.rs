//! Website URL canonicalization before any network call.

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<UrlError> for coverscout_core::Error {
    fn from(err: UrlError) -> Self {
        coverscout_core::Error::InvalidUrl(err.to_string())
    }
}

/// Canonicalize a user-supplied website address.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing (also for `//host` forms)
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if has_scheme(trimmed) {
        trimmed.to_string()
    } else if let Some(rest) = trimmed.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        format!("https://{trimmed}")
    };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::InvalidUrl(format!("missing host in {url_str}")));
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Whether `input` starts with `scheme://`, per RFC 3986 scheme syntax.
///
/// A `://` later in the path or query does not count.
fn has_scheme(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once("://") else {
        return false;
    };
    scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_basic() {
        let url = canonicalize("https://mangadex.org/title/1").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("mangadex.org"));
        assert_eq!(url.path(), "/title/1");
    }

    #[test]
    fn test_canonicalize_default_scheme() {
        let url = canonicalize("site.test/manga/1").unwrap();
        assert_eq!(url.as_str(), "https://site.test/manga/1");
    }

    #[test]
    fn test_canonicalize_nested_url_in_query() {
        let url = canonicalize("site.test/read?next=https://cdn.test/x").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("site.test"));
        assert_eq!(url.query(), Some("next=https://cdn.test/x"));

        let url = canonicalize("site.test/go/https://cdn.test/x").unwrap();
        assert_eq!(url.path(), "/go/https://cdn.test/x");
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("https://site.test"));
        assert!(has_scheme("HTTP://site.test"));
        assert!(has_scheme("git+ssh://site.test"));
        assert!(!has_scheme("site.test/read?next=https://cdn.test"));
        assert!(!has_scheme("site.test"));
        assert!(!has_scheme("://site.test"));
        assert!(!has_scheme("1abc://site.test"));
    }

    #[test]
    fn test_canonicalize_protocol_relative() {
        let url = canonicalize("//site.test/manga/1").unwrap();
        assert_eq!(url.as_str(), "https://site.test/manga/1");
    }

    #[test]
    fn test_canonicalize_lowercase_host() {
        let url = canonicalize("https://SITE.Test/Manga").unwrap();
        assert_eq!(url.host_str(), Some("site.test"));
        assert_eq!(url.path(), "/Manga");
    }

    #[test]
    fn test_canonicalize_remove_fragment_keep_query() {
        let url = canonicalize("https://site.test/read?ch=12&p=3#top").unwrap();
        assert_eq!(url.query(), Some("ch=12&p=3"));
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_canonicalize_http_allowed() {
        let url = canonicalize("http://site.test").unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn test_canonicalize_trim_whitespace() {
        let url = canonicalize("  https://site.test  ").unwrap();
        assert_eq!(url.as_str(), "https://site.test/");
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize("ftp://site.test/cover.png");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_canonicalize_empty() {
        assert!(matches!(canonicalize(""), Err(UrlError::Empty)));
        assert!(matches!(canonicalize("   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_canonicalize_invalid() {
        assert!(matches!(canonicalize("https://exa mple.com"), Err(UrlError::InvalidUrl(_))));
    }

    #[test]
    fn test_url_error_into_core_error() {
        let err: coverscout_core::Error = UrlError::Empty.into();
        assert!(matches!(err, coverscout_core::Error::InvalidUrl(_)));
    }
}
