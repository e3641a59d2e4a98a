//! Tunable thresholds and keyword lists used by the extraction pipeline.
//!
//! The defaults reproduce the empirically tuned values from `constants`;
//! every field can be overridden independently.

use std::time::Duration;

use crate::constants::{
    ACTION_VERBS, BROWSER_USER_AGENT, COMMENTS_TEXT_LIMIT, COMPONENT_KEYWORDS, FETCH_TIMEOUT_SECS,
    MAX_BULLET_LEN, MEASUREMENT_UNITS, MIN_INGREDIENTS, MIN_INSTRUCTIONS, MODEL_TIMEOUT_SECS,
    PROMPT_HTML_LIMIT, SECTION_HEADER_MAX_LEN, STAPLE_INGREDIENTS, STAPLE_PHRASE_MAX_LEN,
};

/// Minimum amount of data a structural candidate needs to skip the model fallback.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct UsabilityThreshold {
    pub min_ingredients: usize,
    pub min_instructions: usize,
}

impl Default for UsabilityThreshold {
    fn default() -> Self {
        Self {
            min_ingredients: MIN_INGREDIENTS,
            min_instructions: MIN_INSTRUCTIONS,
        }
    }
}

impl UsabilityThreshold {
    #[must_use]
    pub fn accepts(&self, ingredients: usize, instructions: usize) -> bool {
        ingredients >= self.min_ingredients && instructions >= self.min_instructions
    }
}

/// Rules for the "looks like an ingredient" bullet classifier.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IngredientRules {
    /// Bullets longer than this (in characters) are prose, not ingredients.
    pub max_bullet_len: usize,
    /// Staple phrases are accepted without a measurement up to this length.
    pub staple_phrase_max_len: usize,
    /// Longest text before a bullet still treated as a section header.
    pub section_header_max_len: usize,
    pub action_verbs: &'static [&'static str],
    pub units: &'static [&'static str],
    pub staples: &'static [&'static str],
    pub component_keywords: &'static [&'static str],
}

impl Default for IngredientRules {
    fn default() -> Self {
        Self {
            max_bullet_len: MAX_BULLET_LEN,
            staple_phrase_max_len: STAPLE_PHRASE_MAX_LEN,
            section_header_max_len: SECTION_HEADER_MAX_LEN,
            action_verbs: ACTION_VERBS,
            units: MEASUREMENT_UNITS,
            staples: STAPLE_INGREDIENTS,
            component_keywords: COMPONENT_KEYWORDS,
        }
    }
}

/// Everything the orchestrator needs besides the page and the models.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ExtractionConfig {
    pub usability: UsabilityThreshold,
    pub ingredient_rules: IngredientRules,
    pub prompt_html_limit: usize,
    pub comments_text_limit: usize,
    pub model_timeout: Duration,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            usability: UsabilityThreshold::default(),
            ingredient_rules: IngredientRules::default(),
            prompt_html_limit: PROMPT_HTML_LIMIT,
            comments_text_limit: COMMENTS_TEXT_LIMIT,
            model_timeout: Duration::from_secs(MODEL_TIMEOUT_SECS),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: BROWSER_USER_AGENT.to_owned(),
            timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
        }
    }
}
