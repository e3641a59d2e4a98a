//! The generate module is the last-resort strategy: a language model reads the
//! page markup and answers with recipe JSON. It also produces the summary of
//! reader tips for recipes recovered from structured data.

use llm::chat::{ChatMessage, ChatProvider};
use log::{debug, warn};
use once_cell::sync::Lazy;
use rate_guard::{RateLimit, StdTokenBucket, TokenBucketBuilder};
use regex::Regex;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::constants::{
    CODE_FENCE, DEFAULT_COMMENTS_PROMPT, DEFAULT_EXTRACTION_PROMPT, DEFAULT_TITLE,
    NO_COMMENTS_SENTINEL, THINK_STRIPPER,
};
use crate::error::ExtractError;
use crate::extract::ExtractContext;
use crate::recipe::{RawPage, Recipe};
use crate::text::{char_prefix, char_suffix, visible_text};

static THINK_STRIPPER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(THINK_STRIPPER).expect("Failed to compile THINK_STRIPPER regex"));

static CODE_FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(CODE_FENCE).expect("Failed to compile CODE_FENCE regex"));

/// Builds a token bucket allowing `rpm` model requests per minute.
#[must_use]
pub fn build_rate_limiter(rpm: u32) -> Option<StdTokenBucket> {
    let capacity = u64::from(rpm.max(1));
    let refill_interval = Duration::from_secs_f64(60.0 / capacity as f64);

    TokenBucketBuilder::builder()
        .capacity(capacity)
        .refill_amount(1_u64)
        .refill_every(refill_interval)
        .with_time(rate_guard::StdTimeSource::new())
        .with_precision::<rate_guard::Nanos>()
        .build()
        .ok()
}

/// User messages for the extraction call. The markup is cut to `html_limit`
/// characters; when the template has no `{html}` placeholder the markup is
/// sent as a second message.
#[must_use]
pub fn extraction_prompt(
    template: Option<&str>,
    url: &str,
    html: &str,
    html_limit: usize,
) -> Vec<String> {
    let template = template.unwrap_or(DEFAULT_EXTRACTION_PROMPT);
    let markup = char_prefix(html, html_limit);
    let prompt = template.replace("{url}", url).replace("{html}", markup);

    if template.contains("{html}") {
        vec![prompt]
    } else {
        vec![prompt, markup.to_owned()]
    }
}

/// Prompt for the reader-tips summary: the tail of the page's visible text,
/// where comment sections live.
#[must_use]
pub fn comments_prompt(url: &str, html: &str, text_limit: usize) -> String {
    let text = visible_text(html);
    DEFAULT_COMMENTS_PROMPT
        .replace("{url}", url)
        .replace("{text}", char_suffix(&text, text_limit))
}

#[must_use]
pub fn strip_reasoning(response: &str) -> String {
    THINK_STRIPPER_REGEX
        .replace_all(response, "")
        .trim()
        .to_owned()
}

/// Removes Markdown code fences (```` ```json ```` / ```` ``` ````) around a reply.
#[must_use]
pub fn strip_code_fences(response: &str) -> String {
    CODE_FENCE_REGEX.replace_all(response, "").trim().to_owned()
}

/// Empty string for the "no comments" sentinel, trimmed text otherwise.
#[must_use]
pub fn normalize_comments_summary(summary: &str) -> String {
    let summary = summary.trim();
    let sentinel = NO_COMMENTS_SENTINEL.to_lowercase();
    if summary.to_lowercase().trim_end_matches('.') == sentinel {
        String::new()
    } else {
        summary.to_owned()
    }
}

fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.trim().to_owned(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}

fn coerce_list(value: Option<&Value>) -> Vec<String> {
    value.and_then(Value::as_array).map_or_else(Vec::new, |values| {
        values
            .iter()
            .map(|value| coerce_string(Some(value)))
            .filter(|text| !text.is_empty())
            .collect()
    })
}

/// Coerces every field of a model-produced object to its expected type.
#[must_use]
pub fn coerce_recipe(object: &Map<String, Value>, url: &str) -> Recipe {
    let title = coerce_string(object.get("title"));
    let source_url = coerce_string(object.get("sourceUrl"));

    Recipe {
        title: if title.is_empty() {
            DEFAULT_TITLE.to_owned()
        } else {
            title
        },
        servings: coerce_string(object.get("servings")),
        prep_time: coerce_string(object.get("prepTime")),
        cook_time: coerce_string(object.get("cookTime")),
        ingredients: coerce_list(object.get("ingredients")),
        instructions: coerce_list(object.get("instructions")),
        source_url: if source_url.is_empty() {
            url.to_owned()
        } else {
            source_url
        },
        comments_summary: normalize_comments_summary(&coerce_string(
            object.get("commentsSummary"),
        )),
    }
}

/// Parses a model reply into a recipe.
///
/// # Errors
///
/// Returns [`ExtractError::GenerativeParse`] if the reply, once reasoning
/// blocks and code fences are removed, is not a JSON object.
pub fn parse_generated_recipe(response: &str, url: &str) -> Result<Recipe, ExtractError> {
    let cleaned = strip_code_fences(&strip_reasoning(response));
    let parsed: Value = serde_json::from_str(&cleaned).map_err(|err| {
        debug!("Unparseable model reply: {cleaned}");
        ExtractError::GenerativeParse(err.to_string())
    })?;

    parsed
        .as_object()
        .map(|object| coerce_recipe(object, url))
        .ok_or_else(|| {
            ExtractError::GenerativeParse(format!("expected a JSON object, got {parsed}"))
        })
}

/// Sends one chat request, honouring the rate limiter and the model timeout.
async fn complete(
    model: &dyn ChatProvider,
    contents: Vec<String>,
    ctx: &ExtractContext<'_>,
) -> Result<String, ExtractError> {
    let messages: Vec<ChatMessage> = contents
        .into_iter()
        .map(|content| ChatMessage::user().content(content).build())
        .collect();

    if let Some(limiter) = ctx.rate_limiter {
        while limiter.try_acquire(1).is_err() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    let timeout = ctx.config.model_timeout;
    let response = tokio::time::timeout(timeout, model.chat(&messages))
        .await
        .map_err(|_| ExtractError::ModelTimeout(timeout))?
        .map_err(|err| ExtractError::Model(err.to_string()))?
        .to_string();

    Ok(strip_reasoning(&response))
}

/// Generative strategy: asks the extraction model for the whole recipe,
/// reader tips included.
///
/// # Errors
///
/// Returns an error if no model is configured, the model call fails or
/// times out, or the reply is not a JSON object.
pub async fn generate_recipe(page: &RawPage, ctx: &ExtractContext<'_>) -> Result<Recipe, ExtractError> {
    let model = ctx.model.ok_or(ExtractError::ModelUnavailable)?;
    let contents = extraction_prompt(
        ctx.prompt_template,
        &page.url,
        &page.html,
        ctx.config.prompt_html_limit,
    );

    let response = complete(model, contents, ctx).await?;
    parse_generated_recipe(&response, &page.url)
}

/// Summary of reader tips for a recipe recovered without the model. Any
/// failure only costs the summary, so it is logged and yields an empty string.
pub async fn summarize_comments(page: &RawPage, ctx: &ExtractContext<'_>) -> String {
    let Some(model) = ctx.summary_model else {
        return String::new();
    };

    let prompt = comments_prompt(&page.url, &page.html, ctx.config.comments_text_limit);
    match complete(model, vec![prompt], ctx).await {
        Ok(summary) => normalize_comments_summary(&summary),
        Err(err) => {
            warn!("Skipping comments summary for {}: {err}", page.url);
            String::new()
        }
    }
}
