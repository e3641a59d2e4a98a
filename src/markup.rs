//! Narrow, regex-based pattern matching over raw markup.
//!
//! This is not an HTML parser: each function recognises one shape (headings,
//! lists, list items, attributes, element bodies) and degrades to "nothing
//! found" on markup it does not understand.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::{collapse_whitespace, decode_entities, strip_tags};

static HEADING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<h([1-6])\b[^>]*>(.*?)</h[1-6]\s*>").expect("Failed to compile heading regex")
});

static LIST_OPEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(ul|ol)\b([^>]*)>").expect("Failed to compile list regex")
});

static LIST_ITEM_OPEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<li\b[^>]*>").expect("Failed to compile list item regex"));

static LIST_ITEM_CLOSE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</li\s*>").expect("Failed to compile list item close regex"));

static TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("Failed to compile tag regex"));

static TITLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("Failed to compile title regex")
});

/// A heading element and its byte span in the searched markup.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Heading {
    pub level: u8,
    /// Stripped heading text.
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// A `<ul>`/`<ol>` element and its byte span in the searched markup.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ListBlock {
    pub start: usize,
    pub end: usize,
    /// Raw attribute text of the opening tag.
    pub attributes: String,
    pub items: Vec<String>,
}

impl ListBlock {
    /// Whether the `class` or `id` attribute mentions `keyword`, case-insensitively.
    #[must_use]
    pub fn is_marked_with(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        ["class", "id"].iter().any(|name| {
            attribute_value(&self.attributes, name)
                .is_some_and(|value| value.to_lowercase().contains(&keyword))
        })
    }
}

/// Every `<h1>`..`<h6>` element in document order.
#[must_use]
pub fn headings(html: &str) -> Vec<Heading> {
    HEADING_REGEX
        .captures_iter(html)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Heading {
                level: caps.get(1)?.as_str().parse().ok()?,
                text: strip_tags(caps.get(2)?.as_str()),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Every top-level `<ul>`/`<ol>` element in document order. Lists nested in
/// an earlier list are part of that list and not reported separately.
#[must_use]
pub fn lists(html: &str) -> Vec<ListBlock> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    for caps in LIST_OPEN_REGEX.captures_iter(html) {
        let (Some(open), Some(tag)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if open.start() < cursor {
            continue;
        }

        let (inner_end, outer_end) =
            element_end(html, &tag.as_str().to_ascii_lowercase(), open.end())
                .unwrap_or((html.len(), html.len()));
        let inner = html.get(open.end()..inner_end).unwrap_or_default();

        blocks.push(ListBlock {
            start: open.start(),
            end: outer_end,
            attributes: caps.get(2).map_or("", |m| m.as_str()).to_owned(),
            items: list_items(inner),
        });
        cursor = outer_end;
    }

    blocks
}

/// Stripped, non-empty `<li>` texts of a list body. A missing `</li>` ends
/// the item at the next `<li>`.
#[must_use]
pub fn list_items(fragment: &str) -> Vec<String> {
    let opens: Vec<_> = LIST_ITEM_OPEN_REGEX.find_iter(fragment).collect();

    opens
        .iter()
        .enumerate()
        .filter_map(|(index, open)| {
            let next_open = opens.get(index + 1).map_or(fragment.len(), |m| m.start());
            let body = fragment.get(open.end()..next_open)?;
            let body = LIST_ITEM_CLOSE_REGEX
                .find(body)
                .and_then(|close| body.get(..close.start()))
                .unwrap_or(body);
            let text = strip_tags(body);
            (!text.is_empty()).then_some(text)
        })
        .collect()
}

/// Value of attribute `name` inside the raw attribute text of an opening tag.
#[must_use]
pub fn attribute_value(attributes: &str, name: &str) -> Option<String> {
    let pattern = format!(
        r#"(?is)(?:^|\s){}\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#,
        regex::escape(name)
    );
    let regex = Regex::new(&pattern).ok()?;
    let caps = regex.captures(attributes)?;

    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str().to_owned())
}

/// Finds where the element `tag` whose body starts at `content_start` ends,
/// counting nested elements of the same name. Returns the byte offset of its
/// closing tag and the offset just past it.
#[must_use]
pub fn element_end(html: &str, tag: &str, content_start: usize) -> Option<(usize, usize)> {
    let lower = html.to_ascii_lowercase();
    let open = format!("<{tag}");
    let close = format!("</{tag}");
    let mut depth = 1_usize;
    let mut cursor = content_start;

    loop {
        let rest = lower.get(cursor..)?;
        let next_close = find_tag(rest, &close)?;

        match find_tag(rest, &open) {
            Some(next_open) if next_open < next_close => {
                depth += 1;
                cursor += next_open + open.len();
            }
            _ => {
                depth -= 1;
                let close_start = cursor + next_close;
                if depth == 0 {
                    let close_len = lower.get(close_start..)?.find('>')? + 1;
                    return Some((close_start, close_start + close_len));
                }
                cursor = close_start + close.len();
            }
        }
    }
}

/// Position of `needle` (`<tag` or `</tag`) not followed by more name characters.
fn find_tag(haystack: &str, needle: &str) -> Option<usize> {
    haystack.match_indices(needle).map(|(index, _)| index).find(|index| {
        haystack
            .get(index + needle.len()..)
            .and_then(|rest| rest.chars().next())
            .is_none_or(|next| !next.is_ascii_alphanumeric() && next != '-')
    })
}

/// Page title from `<title>`, falling back to the first `<h1>` and then `<h2>`.
#[must_use]
pub fn page_title(html: &str) -> Option<String> {
    let title = TITLE_REGEX
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| strip_tags(m.as_str()))
        .filter(|title| !title.is_empty());
    if title.is_some() {
        return title;
    }

    let headings = headings(html);
    [1, 2].iter().find_map(|level| {
        headings
            .iter()
            .find(|heading| heading.level == *level && !heading.text.is_empty())
            .map(|heading| heading.text.clone())
    })
}

/// Decoded, whitespace-collapsed text runs between tags, skipping blank ones.
#[must_use]
pub fn text_nodes(markup: &str) -> Vec<String> {
    TAG_REGEX
        .split(markup)
        .map(|node| collapse_whitespace(&decode_entities(node)))
        .filter(|node| !node.is_empty())
        .collect()
}
