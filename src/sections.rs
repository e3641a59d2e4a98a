//! The sections module recovers ingredient lists that authors split into
//! sub-recipes ("For the sauce:", "For the topping:"), which structured data
//! usually flattens or drops.
//!
//! Two layouts are recognised inside the region between the "Ingredients"
//! heading and the next "Instructions"/"Method"/"Directions" heading:
//! recipe-card plugins that print a checkbox glyph before every ingredient,
//! and plain sub-headings followed by lists.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::IngredientRules;
use crate::constants::{CHECKBOX_GLYPH, INGREDIENTS_HEADING, INSTRUCTION_HEADINGS, VULGAR_FRACTIONS};
use crate::markup::{Heading, ListBlock, headings, lists, text_nodes};
use crate::text::strip_tags;

static BLOCK_CLOSE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</(?:li|p|div|ul|ol|h[1-6])\s*>|<br\s*/?>")
        .expect("Failed to compile block close regex")
});

/// Lowercased alphanumeric words of `text`.
fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

fn contains_word(text: &str, wanted: &str) -> bool {
    words(text).any(|word| word == wanted)
}

#[must_use]
pub fn exceeds_length(text: &str, max_len: usize) -> bool {
    text.chars().count() > max_len
}

/// Whether any word starts with a cooking verb ("sautéed" counts as "sauté").
#[must_use]
pub fn has_action_verb(text: &str, verbs: &[&str]) -> bool {
    words(text).any(|word| verbs.iter().any(|verb| word.starts_with(verb)))
}

/// A digit, a vulgar fraction glyph or a unit word.
#[must_use]
pub fn has_measurement(text: &str, units: &[&str]) -> bool {
    text.chars()
        .any(|c| c.is_ascii_digit() || VULGAR_FRACTIONS.contains(&c))
        || words(text).any(|word| units.iter().any(|unit| *unit == word))
}

#[must_use]
pub fn ends_with_sentence(text: &str) -> bool {
    text.trim_end().ends_with('.')
}

/// Short phrase naming a staple such as salt or garlic.
#[must_use]
pub fn is_staple_phrase(text: &str, staples: &[&str], max_len: usize) -> bool {
    !exceeds_length(text, max_len)
        && words(text).any(|word| staples.iter().any(|staple| word.starts_with(staple)))
}

/// Decides whether a checkbox bullet is an ingredient line rather than a
/// step, a note or a tip.
#[must_use]
pub fn looks_like_ingredient(text: &str, rules: &IngredientRules) -> bool {
    if exceeds_length(text, rules.max_bullet_len) || has_action_verb(text, rules.action_verbs) {
        return false;
    }

    let measured = has_measurement(text, rules.units);
    if ends_with_sentence(text) && !measured {
        return false;
    }

    measured || is_staple_phrase(text, rules.staples, rules.staple_phrase_max_len)
}

/// Markup between the "Ingredients" heading and the next instructions heading
/// (or the end of the document).
#[must_use]
pub fn ingredients_region(html: &str) -> Option<&str> {
    let all = headings(html);
    let start_index = all
        .iter()
        .position(|heading| contains_word(&heading.text, INGREDIENTS_HEADING))?;
    let start = all.get(start_index)?.end;

    let end = all
        .iter()
        .skip(start_index + 1)
        .find(|heading| {
            INSTRUCTION_HEADINGS
                .iter()
                .any(|word| contains_word(&heading.text, word))
        })
        .map_or(html.len(), |heading| heading.start);

    html.get(start..end)
}

/// Section header ("For the sauce:") ending the markup before a bullet.
#[must_use]
pub fn trailing_section_header(markup: &str, max_len: usize) -> Option<String> {
    let last = text_nodes(markup).pop()?;
    (last.ends_with(':') && last.len() > 1 && !exceeds_length(&last, max_len)).then_some(last)
}

/// Splits a bullet fragment into the bullet's own markup and whatever follows
/// its first block-level close that comes after some text.
fn split_bullet(fragment: &str) -> (&str, &str) {
    BLOCK_CLOSE_REGEX
        .find_iter(fragment)
        .find(|close| {
            fragment
                .get(..close.start())
                .is_some_and(|before| !strip_tags(before).is_empty())
        })
        .and_then(|close| Some((fragment.get(..close.start())?, fragment.get(close.end()..)?)))
        .unwrap_or((fragment, ""))
}

/// Splits a section header ("For the topping:") off the end of a plain-text
/// bullet. The header is the first capitalised suffix ending in a colon that
/// fits in `max_len` characters.
fn split_trailing_header(text: &str, max_len: usize) -> Option<(&str, &str)> {
    if !text.ends_with(':') {
        return None;
    }

    text.match_indices(' ')
        .map(|(index, _)| index + 1)
        .find(|start| {
            text.get(*start..).is_some_and(|rest| {
                rest.chars().next().is_some_and(char::is_uppercase) && !exceeds_length(rest, max_len)
            })
        })
        .and_then(|start| Some((text.get(..start)?.trim_end(), text.get(start..)?)))
        .filter(|(own, _)| !own.is_empty())
}

/// Ingredients from a region where every line starts with the checkbox glyph.
#[must_use]
pub fn checkbox_ingredients(region: &str, rules: &IngredientRules) -> Vec<String> {
    let mut fragments = region.split(CHECKBOX_GLYPH);
    let mut preceding = fragments.next().unwrap_or_default().to_owned();
    let mut emitted_header: Option<String> = None;
    let mut pending_header: Option<String> = None;
    let mut output = Vec::new();

    for fragment in fragments {
        if let Some(header) = trailing_section_header(&preceding, rules.section_header_max_len)
            && emitted_header.as_deref() != Some(header.as_str())
        {
            pending_header = Some(header);
        }

        let (bullet_markup, tail) = split_bullet(fragment);
        let text = strip_tags(bullet_markup);
        // Plain-text runs have no block close between a bullet and the next header.
        let trailing = if tail.is_empty() {
            split_trailing_header(&text, rules.section_header_max_len)
        } else {
            None
        };
        let (bullet, next_preceding) = trailing.map_or_else(
            || (text.clone(), tail.to_owned()),
            |(own, header)| (own.to_owned(), header.to_owned()),
        );
        if !bullet.is_empty() && looks_like_ingredient(&bullet, rules) {
            if let Some(header) = pending_header.take() {
                output.push(header.clone());
                emitted_header = Some(header);
            }
            output.push(bullet);
        } else if !bullet.is_empty() {
            debug!("Rejected bullet as non-ingredient: {bullet}");
        }

        preceding = next_preceding;
    }

    output
}

/// Label a sub-heading starts, if any: headings ending in a colon are labels,
/// headings naming a dish component get a colon added, others clear the label.
#[must_use]
pub fn section_label(text: &str, rules: &IngredientRules) -> Option<String> {
    let text = text.trim();
    if text.ends_with(':') {
        return Some(text.to_owned());
    }

    let names_component = words(text).any(|word| {
        rules
            .component_keywords
            .iter()
            .any(|keyword| word.starts_with(keyword))
    });
    names_component.then(|| format!("{text}:"))
}

enum RegionElement {
    Heading(Heading),
    List(ListBlock),
}

impl RegionElement {
    fn start(&self) -> usize {
        match self {
            Self::Heading(heading) => heading.start,
            Self::List(block) => block.start,
        }
    }
}

/// Ingredients from a region of sub-headings (`<h2>`..`<h5>`) and lists.
#[must_use]
pub fn sectioned_list_ingredients(region: &str, rules: &IngredientRules) -> Vec<String> {
    let mut elements: Vec<RegionElement> = headings(region)
        .into_iter()
        .filter(|heading| (2..=5).contains(&heading.level))
        .map(RegionElement::Heading)
        .chain(lists(region).into_iter().map(RegionElement::List))
        .collect();
    elements.sort_by_key(RegionElement::start);

    let mut label: Option<String> = None;
    let mut output = Vec::new();
    for element in elements {
        match element {
            RegionElement::Heading(heading) => label = section_label(&heading.text, rules),
            RegionElement::List(block) => {
                for item in block.items {
                    if let Some(label) = label.take() {
                        output.push(label);
                    }
                    output.push(item);
                }
            }
        }
    }

    output
}

/// Section-aware ingredient list of the page, or `None` when there is no
/// ingredients region or nothing in it.
#[must_use]
pub fn extract_sectioned_ingredients(html: &str, rules: &IngredientRules) -> Option<Vec<String>> {
    let region = ingredients_region(html)?;

    let items = if region.contains(CHECKBOX_GLYPH) {
        checkbox_ingredients(region, rules)
    } else {
        sectioned_list_ingredients(region, rules)
    };

    (!items.is_empty()).then_some(items)
}

/// Whether the section-aware list should replace the current one.
#[must_use]
pub fn should_override(current: usize, sectioned: usize, min_items: usize) -> bool {
    sectioned >= min_items && sectioned >= current
}

/// Replaces `ingredients` with the section-aware list when it is at least as
/// long and has at least `min_items` lines. Returns whether it did.
pub fn enhance_ingredients(
    ingredients: &mut Vec<String>,
    html: &str,
    rules: &IngredientRules,
    min_items: usize,
) -> bool {
    let Some(sectioned) = extract_sectioned_ingredients(html, rules) else {
        return false;
    };
    if !should_override(ingredients.len(), sectioned.len(), min_items) {
        return false;
    }

    *ingredients = sectioned;
    true
}
