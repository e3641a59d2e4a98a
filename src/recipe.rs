//! Recipe record produced by the pipeline and the per-strategy candidate shape.

use serde::{Deserialize, Serialize};

use crate::config::UsabilityThreshold;

/// A fully validated recipe. Absent scalars are empty strings and absent
/// lists are empty vectors, never missing.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    pub title: String,
    pub servings: String,
    pub prep_time: String,
    pub cook_time: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub source_url: String,
    pub comments_summary: String,
}

impl Recipe {
    /// Whether the recipe carries enough data to be shown without the model fallback.
    #[must_use]
    pub fn is_usable(&self, threshold: &UsabilityThreshold) -> bool {
        threshold.accepts(self.ingredients.len(), self.instructions.len())
    }
}

/// Partial output of a single extraction strategy: the recipe's shape with
/// every field optional.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ExtractionCandidate {
    pub title: Option<String>,
    pub servings: Option<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    pub source_url: Option<String>,
    pub comments_summary: Option<String>,
}

impl ExtractionCandidate {
    #[must_use]
    pub fn ingredient_count(&self) -> usize {
        self.ingredients.as_ref().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.instructions.as_ref().map_or(0, Vec::len)
    }

    /// Fills every absent field with its empty value; an absent source URL
    /// becomes `page_url`.
    #[must_use]
    pub fn into_recipe(self, page_url: &str) -> Recipe {
        Recipe {
            title: self.title.unwrap_or_default(),
            servings: self.servings.unwrap_or_default(),
            prep_time: self.prep_time.unwrap_or_default(),
            cook_time: self.cook_time.unwrap_or_default(),
            ingredients: self.ingredients.unwrap_or_default(),
            instructions: self.instructions.unwrap_or_default(),
            source_url: self
                .source_url
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| page_url.to_owned()),
            comments_summary: self.comments_summary.unwrap_or_default(),
        }
    }
}

/// Markup of a fetched page together with the URL it came from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RawPage {
    pub url: String,
    pub html: String,
}

impl RawPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}
