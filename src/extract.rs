//! The extract module runs the extraction strategies in priority order and
//! applies the single accept/reject policy between them.
//!
//! Structural strategies are pure functions of the page; the first one whose
//! candidate passes the usability threshold wins. Only when all of them fall
//! short is the language model asked for the recipe.

use llm::chat::ChatProvider;
use log::{debug, info};
use rate_guard::StdTokenBucket;
use std::fmt;
use url::Url;

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::fetch::PageFetcher;
use crate::generate::{generate_recipe, summarize_comments};
use crate::recipe::{ExtractionCandidate, RawPage, Recipe};
use crate::sections::enhance_ingredients;
use crate::{jsonld, microdata};

/// Where a recipe came from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExtractionMethod {
    JsonLd,
    Microdata,
    Generative,
}

impl ExtractionMethod {
    /// Whether a structurally extracted recipe should still get a reader-tips
    /// summary from the model.
    #[must_use]
    pub fn wants_comments_summary(self) -> bool {
        matches!(self, Self::JsonLd)
    }

    /// Whether the section-aware ingredient list may be applied before the
    /// usability gate. Heading lists often stop at the first ingredient
    /// group, so microdata candidates get the chance to be completed first.
    #[must_use]
    pub fn enhances_before_gate(self) -> bool {
        matches!(self, Self::Microdata)
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::JsonLd => "json-ld",
            Self::Microdata => "microdata",
            Self::Generative => "generative",
        };
        formatter.write_str(name)
    }
}

/// A structural strategy: pure, and `None` when it finds nothing at all.
#[derive(Clone, Copy)]
pub struct Strategy {
    pub method: ExtractionMethod,
    pub extract: fn(&RawPage) -> Option<ExtractionCandidate>,
}

/// Structural strategies in priority order.
pub const STRUCTURAL_STRATEGIES: [Strategy; 2] = [
    Strategy {
        method: ExtractionMethod::JsonLd,
        extract: jsonld::extract,
    },
    Strategy {
        method: ExtractionMethod::Microdata,
        extract: microdata::extract,
    },
];

/// Shared data for one or more extraction calls.
pub struct ExtractContext<'a> {
    /// Model for the generative strategy; `None` makes that strategy fail.
    pub model: Option<&'a dyn ChatProvider>,
    /// Smaller-budget model for reader-tips summaries; `None` skips them.
    pub summary_model: Option<&'a dyn ChatProvider>,
    /// Replacement for the default extraction prompt.
    pub prompt_template: Option<&'a str>,
    /// Rate limiter for controlling model request frequency
    pub rate_limiter: Option<&'a StdTokenBucket>,
    pub config: ExtractionConfig,
}

/// A recipe together with the strategy that produced it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Extraction {
    pub recipe: Recipe,
    pub method: ExtractionMethod,
}

fn enhance(recipe: &mut Recipe, page: &RawPage, config: &ExtractionConfig) -> bool {
    enhance_ingredients(
        &mut recipe.ingredients,
        &page.html,
        &config.ingredient_rules,
        config.usability.min_ingredients,
    )
}

/// Runs `strategies` in order and returns the first usable result, with its
/// ingredients replaced by the section-aware list when that list is better.
/// JSON-LD candidates are gated before enhancement, microdata candidates after.
#[must_use]
pub fn run_structural(
    page: &RawPage,
    strategies: &[Strategy],
    config: &ExtractionConfig,
) -> Option<Extraction> {
    for strategy in strategies {
        let Some(candidate) = (strategy.extract)(page) else {
            continue;
        };

        let enhance_first = strategy.method.enhances_before_gate();
        let mut recipe = candidate.into_recipe(&page.url);
        let enhanced_before = enhance_first && enhance(&mut recipe, page, config);

        if !recipe.is_usable(&config.usability) {
            debug!(
                "{} candidate on {} below threshold ({} ingredients, {} instructions)",
                strategy.method,
                page.url,
                recipe.ingredients.len(),
                recipe.instructions.len()
            );
            continue;
        }

        let enhanced_after = !enhance_first && enhance(&mut recipe, page, config);
        if enhanced_before || enhanced_after {
            info!("Using sectioned ingredient list for {}", page.url);
        }

        return Some(Extraction {
            recipe,
            method: strategy.method,
        });
    }

    None
}

/// Structural extraction with the default strategy list.
#[must_use]
pub fn extract_structured(page: &RawPage, config: &ExtractionConfig) -> Option<Extraction> {
    run_structural(page, &STRUCTURAL_STRATEGIES, config)
}

/// Extracts a recipe from already fetched markup.
///
/// # Errors
///
/// Returns an error only when every structural strategy fell short and the
/// generative strategy failed too: no model configured, model call failure or
/// timeout, or an unparseable model reply.
pub async fn extract_page(
    page: &RawPage,
    ctx: &ExtractContext<'_>,
) -> Result<Extraction, ExtractError> {
    if let Some(mut extraction) = extract_structured(page, &ctx.config) {
        if extraction.method.wants_comments_summary() {
            extraction.recipe.comments_summary = summarize_comments(page, ctx).await;
        }
        info!("Extracted {} via {}", page.url, extraction.method);
        return Ok(extraction);
    }

    info!(
        "No structured recipe on {}, falling back to the language model",
        page.url
    );
    let recipe = generate_recipe(page, ctx).await?;

    Ok(Extraction {
        recipe,
        method: ExtractionMethod::Generative,
    })
}

/// Fetches `url` and extracts its recipe.
///
/// # Arguments
///
/// * `url` - Address of the recipe page
/// * `fetcher` - HTTP client used to download the page
/// * `ctx` - Models, prompt template, rate limiter and thresholds
///
/// # Errors
///
/// Returns an error if:
/// * The URL cannot be parsed
/// * The page cannot be fetched or answers with a non-success status
/// * No strategy produced a recipe (see [`extract_page`])
pub async fn extract_recipe(
    url: &str,
    fetcher: &PageFetcher,
    ctx: &ExtractContext<'_>,
) -> Result<Recipe, ExtractError> {
    let parsed = Url::parse(url).map_err(|source| ExtractError::InvalidUrl {
        url: url.to_owned(),
        source,
    })?;

    let page = fetcher.fetch(&parsed).await?;
    extract_page(&page, ctx).await.map(|extraction| extraction.recipe)
}
