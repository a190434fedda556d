//! Deterministic placeholder covers.
//!
//! A placeholder is used whenever cover resolution yields nothing, and as
//! the initial cover of a freshly created entry while resolution runs in
//! the background.

use url::Url;

const FALLBACK_TEXT: &str = "Manga";

/// Build the placeholder cover URL for `title`.
///
/// The same `(base, title)` pair always yields the same URL. A blank title
/// falls back to a generic label. If `base` is not a valid URL the title is
/// appended as a plain query string.
pub fn placeholder_cover(base: &str, title: &str) -> String {
    let text = match title.trim() {
        "" => FALLBACK_TEXT,
        t => t,
    };

    match Url::parse(base) {
        Ok(mut url) => {
            url.query_pairs_mut().clear().append_pair("text", text);
            url.to_string()
        }
        Err(_) => {
            let encoded: String = url::form_urlencoded::byte_serialize(text.as_bytes()).collect();
            format!("{base}?text={encoded}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://placehold.co/300x420";

    #[test]
    fn test_placeholder_basic() {
        assert_eq!(placeholder_cover(BASE, "Berserk"), "https://placehold.co/300x420?text=Berserk");
    }

    #[test]
    fn test_placeholder_encodes_title() {
        let url = placeholder_cover(BASE, "One Piece & Friends");
        assert_eq!(url, "https://placehold.co/300x420?text=One+Piece+%26+Friends");
    }

    #[test]
    fn test_placeholder_is_deterministic() {
        assert_eq!(placeholder_cover(BASE, "Vinland Saga"), placeholder_cover(BASE, "Vinland Saga"));
        assert_ne!(placeholder_cover(BASE, "Vinland Saga"), placeholder_cover(BASE, "Vagabond"));
    }

    #[test]
    fn test_placeholder_blank_title() {
        assert_eq!(placeholder_cover(BASE, "   "), "https://placehold.co/300x420?text=Manga");
    }

    #[test]
    fn test_placeholder_replaces_existing_query() {
        let url = placeholder_cover("https://placehold.co/300x420?text=old", "New");
        assert_eq!(url, "https://placehold.co/300x420?text=New");
    }

    #[test]
    fn test_placeholder_invalid_base() {
        assert_eq!(placeholder_cover("not a url", "A B"), "not a url?text=A+B");
    }
}
