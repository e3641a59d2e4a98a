use crate::extract_extras::strings;
use ladle::IngredientRules;
use ladle::sections::{
    checkbox_ingredients, ends_with_sentence, enhance_ingredients, exceeds_length,
    extract_sectioned_ingredients, has_action_verb, has_measurement, ingredients_region,
    is_staple_phrase, section_label, should_override, trailing_section_header,
};
use spectral::prelude::*;

mod extract_extras;

const CHECKBOX_CARD: &str = r#"<h2>Ingredients</h2>
<div class="wprm-recipe-ingredient-group">
  <h3 class="wprm-recipe-group-name">For the sauce:</h3>
  <ul>
    <li><span class="wprm-checkbox">▢</span> 1 cup tomato</li>
    <li><span class="wprm-checkbox">▢</span> 2 cloves garlic crushed, minced, and sautéed until soft</li>
    <li><span class="wprm-checkbox">▢</span> salt and pepper</li>
  </ul>
  <h3 class="wprm-recipe-group-name">For the topping:</h3>
  <ul>
    <li><span class="wprm-checkbox">▢</span> 100 g mozzarella</li>
    <li><span class="wprm-checkbox">▢</span> Fresh basil</li>
    <li><span class="wprm-checkbox">▢</span> Serve warm with crusty bread.</li>
  </ul>
</div>
<h2>Instructions</h2>
<ol><li>▢ 2 cups of something that must not be read</li></ol>"#;

const SUB_HEADING_LISTS: &str = r#"<h1>Lasagne</h1>
<h2>Ingredients</h2>
<h3>For the ragù</h3>
<ul><li>500 g beef mince</li><li>1 onion</li></ul>
<h3>Béchamel</h3>
<ul><li>50 g butter</li><li>50 g flour</li><li>500 ml milk</li></ul>
<h3>Equipment</h3>
<ul><li>Baking dish</li></ul>
<h2>Method</h2>
<ol><li>Brown the beef.</li></ol>"#;

assert_bullets![
    measured_line: "1 cup tomato" => true,
    fraction_glyph: "½ onion, diced" => true,
    unit_word_only: "pinch of nutmeg" => true,
    staple_phrase: "salt and pepper" => true,
    step_with_verb: "2 cloves garlic crushed, minced, and sautéed until soft" => false,
    serving_note: "Serve warm with crusty bread." => false,
    unmeasured_sentence: "Use ripe tomatoes." => false,
    plain_word: "Baking dish" => false,
];

#[test]
fn length_check_counts_characters() {
    assert_that(&exceeds_length("½½½", 3)).is_false();
    assert_that(&exceeds_length("abcd", 3)).is_true();
}

#[test]
fn verbs_match_word_prefixes() {
    let verbs = ["sauté", "add"];

    assert_that(&has_action_verb("garlic sautéed until soft", &verbs)).is_true();
    assert_that(&has_action_verb("Additional salt", &verbs)).is_true();
    assert_that(&has_action_verb("1 bad egg", &verbs)).is_false();
}

#[test]
fn units_match_whole_words() {
    let units = ["g", "cup"];

    assert_that(&has_measurement("cup of tea", &units)).is_true();
    assert_that(&has_measurement("garlic", &units)).is_false();
    assert_that(&has_measurement("¾ lemon", &units)).is_true();
}

#[test]
fn sentence_and_staple_checks() {
    assert_that(&ends_with_sentence("Season to taste.  ")).is_true();
    assert_that(&ends_with_sentence("salt")).is_false();
    assert_that(&is_staple_phrase("grated cheese", &["cheese"], 40)).is_true();
    assert_that(&is_staple_phrase("a very long description of some good cheese", &["cheese"], 40)).is_false();
}

#[test]
fn checkbox_run_keeps_header_before_first_ingredient() {
    let rules = IngredientRules::default();
    let region = "For the sauce:▢ 1 cup tomato▢ 2 cloves garlic crushed, minced, and sautéed until soft";

    assert_that(&checkbox_ingredients(region, &rules)).is_equal_to(strings(&["For the sauce:", "1 cup tomato"]));
}

#[test]
fn plain_text_header_after_bullet_is_split_off() {
    let rules = IngredientRules::default();
    let region = "For the sauce:▢ 1 cup tomato For the topping:▢ 100 g mozzarella";

    assert_that(&checkbox_ingredients(region, &rules)).is_equal_to(strings(&[
        "For the sauce:",
        "1 cup tomato",
        "For the topping:",
        "100 g mozzarella",
    ]));
}

#[test]
fn long_colon_phrase_stays_in_bullet() {
    let mut rules = IngredientRules::default();
    rules.section_header_max_len = 10;
    let region = "▢ 1 cup tomato For the topping:▢ 100 g mozzarella";

    assert_that(&checkbox_ingredients(region, &rules)).is_equal_to(strings(&[
        "1 cup tomato For the topping:",
        "100 g mozzarella",
    ]));
}

#[test]
fn header_without_accepted_bullets_is_not_emitted() {
    let rules = IngredientRules::default();
    let region = "For the garnish:▢ Serve with lemon.";

    assert_that(&checkbox_ingredients(region, &rules)).is_empty();
}

#[test]
fn trailing_header_needs_colon_and_short_text() {
    assert_that(&trailing_section_header("<h3>For the sauce:</h3><ul><li>", 50))
        .is_equal_to(Some("For the sauce:".to_owned()));
    assert_that(&trailing_section_header("<p>Notes</p>", 50)).is_none();
    assert_that(&trailing_section_header(":", 50)).is_none();
}

#[test]
fn region_stops_at_instructions_heading() {
    let region = ingredients_region(CHECKBOX_CARD).unwrap();

    assert_that(&region).contains("100 g mozzarella");
    assert_that(&region.contains("must not be read")).is_false();
}

#[test]
fn no_ingredients_heading_means_no_region() {
    assert_that(&ingredients_region("<h2>Instructions</h2><ul><li>1 egg</li></ul>")).is_none();
}

#[test]
fn checkbox_card_with_two_groups() {
    let rules = IngredientRules::default();

    assert_that(&extract_sectioned_ingredients(CHECKBOX_CARD, &rules)).is_equal_to(Some(strings(&[
        "For the sauce:",
        "1 cup tomato",
        "salt and pepper",
        "For the topping:",
        "100 g mozzarella",
        "Fresh basil",
    ])));
}

#[test]
fn component_headings_become_labels() {
    let rules = IngredientRules::default();

    assert_that(&section_label("For the ragù", &rules)).is_equal_to(Some("For the ragù:".to_owned()));
    assert_that(&section_label("Béchamel", &rules)).is_equal_to(Some("Béchamel:".to_owned()));
    assert_that(&section_label("To serve:", &rules)).is_equal_to(Some("To serve:".to_owned()));
    assert_that(&section_label("Equipment", &rules)).is_none();
}

#[test]
fn sub_headings_with_lists() {
    let rules = IngredientRules::default();

    assert_that(&extract_sectioned_ingredients(SUB_HEADING_LISTS, &rules)).is_equal_to(Some(strings(&[
        "For the ragù:",
        "500 g beef mince",
        "1 onion",
        "Béchamel:",
        "50 g butter",
        "50 g flour",
        "500 ml milk",
        "Baking dish",
    ])));
}

#[test]
fn override_needs_minimum_and_no_loss() {
    assert_that(&should_override(4, 6, 3)).is_true();
    assert_that(&should_override(4, 4, 3)).is_true();
    assert_that(&should_override(5, 4, 3)).is_false();
    assert_that(&should_override(0, 2, 3)).is_false();
}

#[test]
fn enhancement_replaces_shorter_flat_list() {
    let rules = IngredientRules::default();
    let mut ingredients = strings(&["1 cup tomato", "salt", "pepper", "mozzarella"]);

    let replaced = enhance_ingredients(&mut ingredients, CHECKBOX_CARD, &rules, 3);

    assert_that(&replaced).is_true();
    assert_that(&ingredients).has_length(6);
}

#[test]
fn enhancement_keeps_longer_flat_list() {
    let rules = IngredientRules::default();
    let original = strings(&["a", "b", "c", "d", "e", "f", "g"]);
    let mut ingredients = original.clone();

    let replaced = enhance_ingredients(&mut ingredients, CHECKBOX_CARD, &rules, 3);

    assert_that(&replaced).is_false();
    assert_that(&ingredients).is_equal_to(original);
}
