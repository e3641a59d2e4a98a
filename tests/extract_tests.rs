use crate::extract_extras::{GRAPH_RECIPE, MICRODATA_PAGE, StubLlmProvider, context, json_ld_page, strings};
use ladle::extract::{STRUCTURAL_STRATEGIES, Strategy, extract_structured, run_structural};
use ladle::{
    ExtractError, ExtractionCandidate, ExtractionConfig, ExtractionMethod, FetchConfig,
    PageFetcher, RawPage, extract_page, extract_recipe,
};
use spectral::prelude::*;

mod extract_extras;

const GENERATED: &str = r#"{"title": "Mystery Stew", "ingredients": ["1 kg beef", "2 carrots", "1 onion"], "instructions": ["Brown.", "Stew."]}"#;

const THIN_JSON_LD: &str = r#"{
  "@type": "Recipe",
  "name": "Thin",
  "recipeIngredient": ["1 egg", "1 cup milk"],
  "recipeInstructions": ["Whisk.", "Fry.", "Flip.", "Fry again.", "Serve."]
}"#;

const SECTIONED_CARD: &str = r#"
<h2>Ingredients</h2>
<p>For the pasta:</p>
<ul><li>▢ 400 g spaghetti</li><li>▢ 1 tbsp salt</li></ul>
<p>For the sauce:</p>
<ul><li>▢ 2 tbsp olive oil</li><li>▢ 3 cloves garlic</li><li>▢ 1 can tomatoes</li></ul>
<h2>Instructions</h2>"#;

const SPLIT_INGREDIENT_LISTS: &str = r#"<html><head><title>Spaghetti al Pomodoro</title></head><body>
<h2>Ingredients</h2>
<h3>For the pasta:</h3>
<ul><li>400 g spaghetti</li><li>1 tbsp salt</li></ul>
<h3>For the sauce:</h3>
<ul><li>2 tbsp olive oil</li><li>3 cloves garlic</li><li>1 can tomatoes</li></ul>
<h2>Instructions</h2>
<ol><li>Boil the pasta.</li><li>Toss with the sauce.</li></ol>
</body></html>"#;

fn page(url: &str, html: &str) -> RawPage {
    RawPage::new(url, html)
}

#[test]
fn json_ld_wins_when_usable() {
    let page = page("https://example.com/pasta", &json_ld_page(GRAPH_RECIPE));
    let extraction = extract_structured(&page, &ExtractionConfig::default()).unwrap();

    assert_that(&extraction.method).is_equal_to(ExtractionMethod::JsonLd);
    assert_that(&extraction.recipe.ingredients).has_length(4);
    assert_that(&extraction.recipe.source_url).is_equal_to("https://example.com/pasta".to_owned());
}

#[test]
fn thin_json_ld_falls_through_to_microdata() {
    let html = format!("{}{}", json_ld_page(THIN_JSON_LD), MICRODATA_PAGE);
    let extraction = extract_structured(&page("https://example.com/x", &html), &ExtractionConfig::default()).unwrap();

    assert_that(&extraction.method).is_equal_to(ExtractionMethod::Microdata);
    assert_that(&extraction.recipe.title).is_equal_to("Lemon Bars".to_owned());
}

#[test]
fn thin_candidates_are_rejected() {
    let page = page("https://example.com/x", &json_ld_page(THIN_JSON_LD));

    assert_that(&extract_structured(&page, &ExtractionConfig::default())).is_none();
}

#[test]
fn sectioned_list_overrides_flat_json_ld_list() {
    let html = format!("{}{SECTIONED_CARD}", json_ld_page(GRAPH_RECIPE));
    let extraction = extract_structured(&page("https://example.com/pasta", &html), &ExtractionConfig::default()).unwrap();

    assert_that(&extraction.recipe.ingredients).is_equal_to(strings(&[
        "For the pasta:",
        "400 g spaghetti",
        "1 tbsp salt",
        "For the sauce:",
        "2 tbsp olive oil",
        "3 cloves garlic",
        "1 can tomatoes",
    ]));
    assert_that(&extraction.recipe.instructions).has_length(3);
}

#[test]
fn heading_lists_split_into_sub_recipes_are_usable() {
    let page = page("https://example.com/spaghetti", SPLIT_INGREDIENT_LISTS);
    let extraction = extract_structured(&page, &ExtractionConfig::default()).unwrap();

    assert_that(&extraction.method).is_equal_to(ExtractionMethod::Microdata);
    assert_that(&extraction.recipe.ingredients).is_equal_to(strings(&[
        "For the pasta:",
        "400 g spaghetti",
        "1 tbsp salt",
        "For the sauce:",
        "2 tbsp olive oil",
        "3 cloves garlic",
        "1 can tomatoes",
    ]));
    assert_that(&extraction.recipe.instructions).has_length(2);
}

#[test]
fn structural_extraction_is_repeatable() {
    let html = format!("{}{SECTIONED_CARD}", json_ld_page(GRAPH_RECIPE));
    let page = page("https://example.com/pasta", &html);
    let config = ExtractionConfig::default();

    assert_that(&extract_structured(&page, &config)).is_equal_to(extract_structured(&page, &config));
}

fn three_and_two(_page: &RawPage) -> Option<ExtractionCandidate> {
    Some(ExtractionCandidate {
        title: Some("Custom".to_owned()),
        ingredients: Some(strings(&["a", "b", "c"])),
        instructions: Some(strings(&["one", "two"])),
        ..ExtractionCandidate::default()
    })
}

fn nothing(_page: &RawPage) -> Option<ExtractionCandidate> {
    None
}

#[test]
fn strategies_run_in_given_order() {
    let strategies = [
        Strategy {
            method: ExtractionMethod::JsonLd,
            extract: nothing,
        },
        Strategy {
            method: ExtractionMethod::Microdata,
            extract: three_and_two,
        },
    ];
    let extraction = run_structural(&page("https://example.com", ""), &strategies, &ExtractionConfig::default()).unwrap();

    assert_that(&extraction.method).is_equal_to(ExtractionMethod::Microdata);
    assert_that(&extraction.recipe.title).is_equal_to("Custom".to_owned());
}

#[test]
fn threshold_is_configurable() {
    let strategies = [Strategy {
        method: ExtractionMethod::Microdata,
        extract: three_and_two,
    }];
    let mut config = ExtractionConfig::default();
    config.usability.min_ingredients = 4;

    assert_that(&run_structural(&page("https://example.com", ""), &strategies, &config)).is_none();
}

#[test]
fn candidate_fills_missing_source_url_from_page() {
    let candidate = ExtractionCandidate {
        title: Some("Soup".to_owned()),
        comments_summary: Some("Readers add lemon.".to_owned()),
        ..ExtractionCandidate::default()
    };
    let recipe = candidate.into_recipe("https://example.com/soup");

    assert_that(&recipe.source_url).is_equal_to("https://example.com/soup".to_owned());
    assert_that(&recipe.comments_summary).is_equal_to("Readers add lemon.".to_owned());
    assert_that(&recipe.ingredients).is_empty();
}

#[test]
fn candidate_source_url_wins_over_page() {
    let candidate = ExtractionCandidate {
        source_url: Some("https://example.com/canonical".to_owned()),
        ..ExtractionCandidate::default()
    };

    assert_that(&candidate.into_recipe("https://example.com/amp").source_url)
        .is_equal_to("https://example.com/canonical".to_owned());
}

#[test]
fn default_strategy_order() {
    let methods: Vec<ExtractionMethod> = STRUCTURAL_STRATEGIES.iter().map(|strategy| strategy.method).collect();

    assert_that(&methods).is_equal_to(vec![ExtractionMethod::JsonLd, ExtractionMethod::Microdata]);
    assert_that(&ExtractionMethod::JsonLd.to_string()).is_equal_to("json-ld".to_owned());
}

#[tokio::test]
async fn json_ld_recipe_gets_comments_summary() {
    let model = StubLlmProvider::new(GENERATED);
    let summary_model = StubLlmProvider::new("Readers swap in fresh tomatoes in summer.");
    let ctx = context(Some(&model), Some(&summary_model));

    let extraction = extract_page(&page("https://example.com/pasta", &json_ld_page(GRAPH_RECIPE)), &ctx).await.unwrap();

    assert_that(&extraction.method).is_equal_to(ExtractionMethod::JsonLd);
    assert_that(&extraction.recipe.comments_summary).is_equal_to("Readers swap in fresh tomatoes in summer.".to_owned());
    assert_that(&model.calls()).is_equal_to(0);
    assert_that(&summary_model.calls()).is_equal_to(1);
    assert_that(&summary_model.last_prompt()).contains("My grandmother made this every Sunday.");
}

#[tokio::test]
async fn microdata_recipe_makes_no_model_calls() {
    let model = StubLlmProvider::new(GENERATED);
    let summary_model = StubLlmProvider::new("tips");
    let ctx = context(Some(&model), Some(&summary_model));

    let extraction = extract_page(&page("https://example.com/bars", MICRODATA_PAGE), &ctx).await.unwrap();

    assert_that(&extraction.method).is_equal_to(ExtractionMethod::Microdata);
    assert_that(&extraction.recipe.comments_summary).is_equal_to(String::new());
    assert_that(&model.calls()).is_equal_to(0);
    assert_that(&summary_model.calls()).is_equal_to(0);
}

#[tokio::test]
async fn split_heading_lists_need_no_model() {
    let model = StubLlmProvider::new(GENERATED);
    let ctx = context(Some(&model), None);

    let extraction = extract_page(&page("https://example.com/spaghetti", SPLIT_INGREDIENT_LISTS), &ctx).await.unwrap();

    assert_that(&extraction.method).is_equal_to(ExtractionMethod::Microdata);
    assert_that(&extraction.recipe.ingredients).has_length(7);
    assert_that(&extraction.recipe.title).is_equal_to("Spaghetti al Pomodoro".to_owned());
    assert_that(&model.calls()).is_equal_to(0);
}

#[tokio::test]
async fn unstructured_page_uses_the_model() {
    let model = StubLlmProvider::new(GENERATED);
    let ctx = context(Some(&model), None);

    let extraction = extract_page(&page("https://example.com/stew", &json_ld_page(THIN_JSON_LD)), &ctx).await.unwrap();

    assert_that(&extraction.method).is_equal_to(ExtractionMethod::Generative);
    assert_that(&extraction.recipe.title).is_equal_to("Mystery Stew".to_owned());
    assert_that(&extraction.recipe.source_url).is_equal_to("https://example.com/stew".to_owned());
    assert_that(&model.calls()).is_equal_to(1);
}

#[tokio::test]
async fn unstructured_page_without_model_fails() {
    let ctx = context(None, None);

    let result = extract_page(&page("https://example.com/stew", "<p>No recipe here.</p>"), &ctx).await;

    assert_that(&matches!(result, Err(ExtractError::ModelUnavailable))).is_true();
}

#[tokio::test]
async fn invalid_url_is_a_fetch_failure() {
    let fetcher = PageFetcher::new(&FetchConfig::default()).unwrap();
    let ctx = context(None, None);

    let error = extract_recipe("not a url", &fetcher, &ctx).await.unwrap_err();

    assert_that(&matches!(error, ExtractError::InvalidUrl { .. })).is_true();
    assert_that(&error.is_fetch_failure()).is_true();
}
