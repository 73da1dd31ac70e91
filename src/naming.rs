//! Slug derivation for content items.
//!
//! The slug is picked once at discovery, first match wins:
//!
//! 1. front matter `slug`, slugified
//! 2. front matter `title`, slugified
//! 3. the file stem; post stems of the form `YYYY-MM-DD-rest` drop the date
//! 4. `"untitled"` when slugification leaves nothing
//!
//! ## Slugify
//!
//! Text is transliterated to ASCII, lowercased, and every run of
//! non-alphanumeric characters becomes a single dash:
//! - `"My Custom Slug"` → `"my-custom-slug"`
//! - `"Crème brûlée!"` → `"creme-brulee"`
//! - `"--"` → `""`

use crate::types::{ContentKind, FrontMatter, scalar_string};

const FALLBACK_SLUG: &str = "untitled";

/// Lowercase, ASCII-only, dash-separated form of `text`.
pub fn slugify(text: &str) -> String {
    deunicode::deunicode(text)
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Strip a leading `YYYY-MM-DD-` date from a filename stem.
///
/// Returns the stem unchanged when it does not start with a full numeric date
/// followed by a dash.
pub fn strip_date_prefix(stem: &str) -> &str {
    let bytes = stem.as_bytes();
    if bytes.len() < 11 {
        return stem;
    }
    let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
    if digits(0..4)
        && bytes[4] == b'-'
        && digits(5..7)
        && bytes[7] == b'-'
        && digits(8..10)
        && bytes[10] == b'-'
    {
        stem[11..].trim_start_matches('-')
    } else {
        stem
    }
}

/// Pick the slug for an item from its front matter and file stem.
pub fn derive_slug(stem: &str, front_matter: &FrontMatter, kind: ContentKind) -> String {
    let from_meta = ["slug", "title"]
        .iter()
        .find_map(|key| front_matter.get(*key).and_then(scalar_string));
    if let Some(text) = from_meta {
        let slug = slugify(&text);
        return if slug.is_empty() {
            FALLBACK_SLUG.to_string()
        } else {
            slug
        };
    }

    let name = if kind.strips_date_prefix() {
        strip_date_prefix(stem)
    } else {
        stem
    };
    let slug = slugify(name);
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fm(value: serde_json::Value) -> FrontMatter {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn slugify_joins_words_with_dashes() {
        assert_eq!(slugify("My Custom Slug"), "my-custom-slug");
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  spaced   out  "), "spaced-out");
    }

    #[test]
    fn slugify_transliterates() {
        assert_eq!(slugify("Crème brûlée"), "creme-brulee");
    }

    #[test]
    fn slugify_of_punctuation_is_empty() {
        assert_eq!(slugify("--!!--"), "");
    }

    #[test]
    fn slug_from_front_matter_slug() {
        let meta = fm(json!({"slug": "My Custom Slug", "title": "Ignored"}));
        assert_eq!(derive_slug("file", &meta, ContentKind::Page), "my-custom-slug");
    }

    #[test]
    fn slug_from_title() {
        let meta = fm(json!({"title": "Hello World"}));
        assert_eq!(derive_slug("file", &meta, ContentKind::Post), "hello-world");
    }

    #[test]
    fn empty_slug_falls_through_to_title() {
        let meta = fm(json!({"slug": "", "title": "Title Wins"}));
        assert_eq!(derive_slug("file", &meta, ContentKind::Page), "title-wins");
    }

    #[test]
    fn post_stem_drops_date_prefix() {
        let meta = FrontMatter::new();
        assert_eq!(derive_slug("2024-01-15-hello", &meta, ContentKind::Post), "hello");
    }

    #[test]
    fn page_stem_keeps_date_prefix() {
        let meta = FrontMatter::new();
        assert_eq!(
            derive_slug("2024-01-15-hello", &meta, ContentKind::Page),
            "2024-01-15-hello"
        );
        assert_eq!(derive_slug("some-post", &meta, ContentKind::Page), "some-post");
    }

    #[test]
    fn non_numeric_date_not_stripped() {
        assert_eq!(strip_date_prefix("2024-ab-15-hello"), "2024-ab-15-hello");
        assert_eq!(strip_date_prefix("2024-01-15"), "2024-01-15");
        assert_eq!(strip_date_prefix("2024-01-15x-hello"), "2024-01-15x-hello");
    }

    #[test]
    fn untitled_fallback() {
        let meta = fm(json!({"title": "???"}));
        assert_eq!(derive_slug("x", &meta, ContentKind::Page), "untitled");
        assert_eq!(
            derive_slug("2024-01-15-", &FrontMatter::new(), ContentKind::Post),
            "untitled"
        );
    }
}
