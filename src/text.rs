//! Plain-text helpers applied to raw markup fragments before they are
//! inspected or returned.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("Failed to compile tag regex"));

static WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));

static INVISIBLE_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->")
        .expect("Failed to compile invisible block regex")
});

const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    // Last, so that an escaped entity such as `&amp;lt;` decodes only once.
    ("&amp;", "&"),
];

/// Replaces the common named HTML entities with their literal characters.
/// Unknown entities are left untouched.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    ENTITIES
        .iter()
        .fold(text.to_owned(), |acc, (entity, literal)| {
            acc.replace(entity, literal)
        })
}

/// Removes every tag span, decodes entities and collapses whitespace.
#[must_use]
pub fn strip_tags(markup: &str) -> String {
    let without_tags = TAG_REGEX.replace_all(markup, "");
    let decoded = decode_entities(&without_tags);
    collapse_whitespace(&decoded)
}

/// Text a reader would see: scripts, styles and comments dropped, then tags stripped.
#[must_use]
pub fn visible_text(html: &str) -> String {
    strip_tags(&INVISIBLE_BLOCK_REGEX.replace_all(html, " "))
}

#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text, " ").trim().to_owned()
}

/// At most `limit` characters from the start of `text`.
#[must_use]
pub fn char_prefix(text: &str, limit: usize) -> &str {
    text.char_indices()
        .nth(limit)
        .map_or(text, |(index, _)| text.get(..index).unwrap_or(text))
}

/// At most `limit` characters from the end of `text`.
#[must_use]
pub fn char_suffix(text: &str, limit: usize) -> &str {
    if limit == 0 {
        return "";
    }
    text.char_indices()
        .rev()
        .nth(limit - 1)
        .map_or(text, |(index, _)| text.get(index..).unwrap_or(text))
}
