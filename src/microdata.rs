//! The microdata module recovers a recipe from inline `itemprop` attributes,
//! or failing that from lists that follow an "Ingredients"/"Instructions" heading.

use log::debug;
use regex::Regex;

use crate::markup::{attribute_value, element_end, headings, lists, page_title};
use crate::recipe::{ExtractionCandidate, RawPage};
use crate::text::{decode_entities, strip_tags};

const VOID_ELEMENTS: &[&str] = &["meta", "link", "img", "input", "br", "source", "hr"];

const INGREDIENT_PROPS: &[&str] = &["recipeIngredient", "ingredients"];
const STEP_PROPS: &[&str] = &["step", "howtostep"];
const INSTRUCTION_HEADINGS: &[&str] = &["Instructions", "Directions", "Method"];

/// Values of every element carrying `itemprop="prop_name"`, in document order.
///
/// The value is the element's `content` attribute when present (`<meta>`-style
/// elements) and its stripped inner text otherwise. Empty values are dropped.
#[must_use]
pub fn extract_by_itemprop(html: &str, prop_name: &str) -> Vec<String> {
    let pattern = format!(
        r#"(?is)<([a-z][a-z0-9]*)\b([^>]*\bitemprop\s*=\s*["'](?:[^"']*\s)?{}(?:\s[^"']*)?["'][^>]*)>"#,
        regex::escape(prop_name)
    );
    let Ok(regex) = Regex::new(&pattern) else {
        return Vec::new();
    };

    regex
        .captures_iter(html)
        .filter_map(|caps| {
            let open = caps.get(0)?;
            let tag = caps.get(1)?.as_str().to_ascii_lowercase();
            let attributes = caps.get(2)?.as_str();

            let value = if let Some(content) = attribute_value(attributes, "content") {
                decode_entities(content.trim())
            } else if VOID_ELEMENTS.contains(&tag.as_str()) || attributes.trim_end().ends_with('/') {
                return None;
            } else {
                let (inner_end, _) = element_end(html, &tag, open.end())?;
                strip_tags(html.get(open.end()..inner_end)?)
            };

            (!value.is_empty()).then_some(value)
        })
        .collect()
}

/// `<li>` texts of the first list after the heading whose text equals
/// `heading_word`, case-insensitively. Without such a heading (or list), the
/// first list whose `class`/`id` contains the singular keyword is used.
#[must_use]
pub fn extract_list_after_heading(html: &str, heading_word: &str) -> Vec<String> {
    let wanted = normalize_heading(heading_word);

    let after_heading = headings(html)
        .into_iter()
        .find(|heading| normalize_heading(&heading.text) == wanted)
        .and_then(|heading| html.get(heading.end..))
        .and_then(|rest| lists(rest).into_iter().find(|block| !block.items.is_empty()));
    if let Some(block) = after_heading {
        return block.items;
    }

    let keyword = wanted.strip_suffix('s').unwrap_or(&wanted);
    lists(html)
        .into_iter()
        .find(|block| !block.items.is_empty() && block.is_marked_with(keyword))
        .map(|block| block.items)
        .unwrap_or_default()
}

fn normalize_heading(text: &str) -> String {
    text.trim().trim_end_matches(':').trim().to_lowercase()
}

fn first_value(html: &str, prop_name: &str) -> Option<String> {
    extract_by_itemprop(html, prop_name).into_iter().next()
}

fn find_ingredients(html: &str) -> Vec<String> {
    INGREDIENT_PROPS
        .iter()
        .map(|prop| extract_by_itemprop(html, prop))
        .find(|found| !found.is_empty())
        .unwrap_or_else(|| extract_list_after_heading(html, "Ingredients"))
}

fn find_instructions(html: &str) -> Vec<String> {
    let primary = extract_by_itemprop(html, "recipeInstructions");
    if !primary.is_empty() {
        return primary;
    }

    let steps: Vec<String> = STEP_PROPS
        .iter()
        .flat_map(|prop| extract_by_itemprop(html, prop))
        .collect();
    if !steps.is_empty() {
        return steps;
    }

    INSTRUCTION_HEADINGS
        .iter()
        .map(|word| extract_list_after_heading(html, word))
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

/// Microdata strategy. Returns whatever was found; the orchestrator decides
/// whether it is enough.
#[must_use]
pub fn extract(page: &RawPage) -> Option<ExtractionCandidate> {
    let html = &page.html;
    let ingredients = find_ingredients(html);
    let instructions = find_instructions(html);

    if ingredients.is_empty() && instructions.is_empty() {
        debug!("No microdata or heading lists on {}", page.url);
        return None;
    }

    Some(ExtractionCandidate {
        title: first_value(html, "name").or_else(|| page_title(html)),
        servings: first_value(html, "recipeYield"),
        prep_time: first_value(html, "prepTime"),
        cook_time: first_value(html, "cookTime").or_else(|| first_value(html, "totalTime")),
        ingredients: Some(ingredients),
        instructions: Some(instructions),
        ..ExtractionCandidate::default()
    })
}
