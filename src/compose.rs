//! The compose module writes the saved recipe book to a Markdown file.

use anyhow::{Context, Result};
use log::info;
use std::fs::OpenOptions;
use std::io::Write;

use crate::recipe::Recipe;
use crate::storage::Storage;

/// Renders one recipe as a Markdown section, blank line included.
#[must_use]
pub fn render_recipe(recipe: &Recipe) -> String {
    let mut lines = vec![format!("## {}", recipe.title)];
    if !recipe.source_url.is_empty() {
        lines.push(format!("Source: <{}>", recipe.source_url));
    }

    let facts: Vec<String> = [
        ("Servings", &recipe.servings),
        ("Prep", &recipe.prep_time),
        ("Cook", &recipe.cook_time),
    ]
    .iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(label, value)| format!("{label}: {value}"))
    .collect();
    if !facts.is_empty() {
        lines.push(facts.join(" | "));
    }

    lines.push(String::new());
    lines.push("### Ingredients".to_owned());
    lines.extend(recipe.ingredients.iter().map(|ingredient| format!("- {ingredient}")));

    lines.push(String::new());
    lines.push("### Instructions".to_owned());
    lines.extend(
        recipe
            .instructions
            .iter()
            .enumerate()
            .map(|(index, step)| format!("{}. {step}", index + 1)),
    );

    if !recipe.comments_summary.is_empty() {
        lines.push(String::new());
        lines.push("### Community tips".to_owned());
        lines.push(recipe.comments_summary.clone());
    }

    format!("{}\n\n", lines.join("\n"))
}

/// Composes the output file from every recipe saved in the database,
/// newest first.
///
/// # Arguments
///
/// * `db_path` - Path to the recipe book database
/// * `output_path` - Path to the Markdown file to (over)write
///
/// # Returns
///
/// Returns the number of recipes written
///
/// # Errors
///
/// Returns an error if:
/// * Database operations fail
/// * File operations fail
pub fn compose(db_path: &str, output_path: &str) -> Result<usize> {
    let storage = Storage::new(db_path)?;

    info!("Composing recipe book {db_path} to {output_path}...");

    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(output_path)
        .with_context(|| format!("Unable to open {output_path}"))?;

    let mut written = 0;
    for url in storage.list_urls()? {
        let Some(stored) = storage.get_recipe(&url)? else {
            continue;
        };

        file.write_all(render_recipe(&stored.recipe).as_bytes())?;
        written += 1;
    }

    info!("Composed {written} recipes");

    Ok(written)
}
