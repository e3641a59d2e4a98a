//! The jsonld module recovers a recipe from schema.org `<script type="application/ld+json">`
//! blocks, the most reliable source of recipe data on the web.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::recipe::{ExtractionCandidate, RawPage};

static JSONLD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script\s*>"#)
        .expect("Failed to compile JSON-LD regex")
});

/// The shapes `recipeInstructions` takes in the wild.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(untagged)]
pub enum RecipeInstructions {
    /// One string, steps separated by newlines.
    Text(String),
    List(Vec<InstructionItem>),
    Single(InstructionItem),
    Other(Value),
}

/// One member of a `recipeInstructions` list.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(untagged)]
pub enum InstructionItem {
    Text(String),
    /// `HowToSection`: a named group of nested steps.
    Section {
        #[serde(rename = "itemListElement")]
        items: Vec<InstructionItem>,
    },
    /// `HowToStep` or any object exposing `text` / `name`.
    Step {
        text: Option<String>,
        name: Option<String>,
    },
    Other(Value),
}

impl RecipeInstructions {
    /// Flattens every shape into one ordered list of non-empty steps.
    #[must_use]
    pub fn into_steps(self) -> Vec<String> {
        let mut steps = Vec::new();
        match self {
            Self::Text(text) => push_lines(&text, &mut steps),
            Self::List(items) => items.into_iter().for_each(|item| item.flatten_into(&mut steps)),
            Self::Single(item) => item.flatten_into(&mut steps),
            Self::Other(_) => {}
        }
        steps
    }
}

impl InstructionItem {
    fn flatten_into(self, steps: &mut Vec<String>) {
        match self {
            Self::Text(text) => push_non_empty(&text, steps),
            Self::Section { items } => items.into_iter().for_each(|item| item.flatten_into(steps)),
            Self::Step { text, name } => {
                let text = text.filter(|text| !text.trim().is_empty()).or(name);
                if let Some(text) = text {
                    push_non_empty(&text, steps);
                }
            }
            Self::Other(_) => {}
        }
    }
}

fn push_lines(text: &str, steps: &mut Vec<String>) {
    text.lines().for_each(|line| push_non_empty(line, steps));
}

fn push_non_empty(text: &str, steps: &mut Vec<String>) {
    let text = text.trim();
    if !text.is_empty() {
        steps.push(text.to_owned());
    }
}

/// Raw bodies of every JSON-LD script block, in document order.
#[must_use]
pub fn script_blocks(html: &str) -> Vec<&str> {
    JSONLD_REGEX
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Whether a node's `@type` is `Recipe` or a list containing it.
#[must_use]
pub fn is_recipe_node(node: &Value) -> bool {
    match node.get("@type") {
        Some(Value::String(kind)) => kind == "Recipe",
        Some(Value::Array(kinds)) => kinds.iter().any(|kind| kind == "Recipe"),
        _ => false,
    }
}

/// Every recipe node in a parsed block: the block is flattened (array members
/// or the object itself) and each node's `@graph` is searched recursively.
#[must_use]
pub fn recipe_nodes(block: &Value) -> Vec<&Value> {
    let mut found = Vec::new();
    collect_recipe_nodes(block, &mut found);
    found
}

fn collect_recipe_nodes<'a>(value: &'a Value, found: &mut Vec<&'a Value>) {
    match value {
        Value::Array(members) => members
            .iter()
            .for_each(|member| collect_recipe_nodes(member, found)),
        Value::Object(object) => {
            if is_recipe_node(value) {
                found.push(value);
            }
            if let Some(graph) = object.get("@graph") {
                collect_recipe_nodes(graph, found);
            }
        }
        _ => {}
    }
}

/// First recipe node across all script blocks; malformed blocks are skipped.
#[must_use]
pub fn find_recipe_node(html: &str) -> Option<Value> {
    for (index, block) in script_blocks(html).into_iter().enumerate() {
        let parsed: Value = match serde_json::from_str(block.trim()) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!("Skipping malformed JSON-LD block #{index}: {err}");
                continue;
            }
        };

        if let Some(node) = recipe_nodes(&parsed).into_iter().next() {
            return Some(node.clone());
        }
    }

    None
}

/// Maps a schema.org Recipe node onto a candidate.
#[must_use]
pub fn candidate_from_node(node: &Value) -> ExtractionCandidate {
    let ingredients = node
        .get("recipeIngredient")
        .or_else(|| node.get("ingredients"))
        .map(string_list);

    let instructions = node
        .get("recipeInstructions")
        .cloned()
        .and_then(|value| serde_json::from_value::<RecipeInstructions>(value).ok())
        .map(RecipeInstructions::into_steps);

    ExtractionCandidate {
        title: scalar(node, "name").or_else(|| scalar(node, "headline")),
        servings: node.get("recipeYield").and_then(|value| match value {
            Value::Array(values) => values.first().and_then(scalar_value),
            other => scalar_value(other),
        }),
        prep_time: scalar(node, "prepTime"),
        cook_time: scalar(node, "cookTime").or_else(|| scalar(node, "totalTime")),
        ingredients,
        instructions,
        ..ExtractionCandidate::default()
    }
}

/// JSON-LD strategy: the first recipe node with both ingredients and instructions.
#[must_use]
pub fn extract(page: &RawPage) -> Option<ExtractionCandidate> {
    let Some(node) = find_recipe_node(&page.html) else {
        debug!("No JSON-LD recipe node on {}", page.url);
        return None;
    };

    let candidate = candidate_from_node(&node);
    if candidate.ingredient_count() == 0 || candidate.instruction_count() == 0 {
        debug!(
            "JSON-LD recipe on {} lacks ingredients or instructions",
            page.url
        );
        return None;
    }

    Some(candidate)
}

fn scalar(node: &Value, key: &str) -> Option<String> {
    node.get(key).and_then(scalar_value)
}

fn scalar_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_owned(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(values) => values
            .iter()
            .filter_map(Value::as_str)
            .filter(|text| !text.trim().is_empty())
            .map(str::to_owned)
            .collect(),
        Value::String(text) if !text.trim().is_empty() => vec![text.clone()],
        _ => Vec::new(),
    }
}
