pub const MODEL_API_KEY_ENV_NAME: &str = "LADLE_MODEL_API_KEY";

pub const DEFAULT_MODEL_URL: &str = "anthropic://claude-3-haiku-20240307";

/// Desktop browser User-Agent; many recipe sites serve bots a stripped page.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub const FETCH_TIMEOUT_SECS: u64 = 30;
pub const MODEL_TIMEOUT_SECS: u64 = 60;

pub const EXTRACTION_MAX_TOKENS: u32 = 4000;
pub const COMMENTS_MAX_TOKENS: u32 = 600;

/// Markup prefix handed to the extraction prompt, in characters.
pub const PROMPT_HTML_LIMIT: usize = 15_000;
/// Visible-text suffix handed to the comments prompt, in characters.
pub const COMMENTS_TEXT_LIMIT: usize = 12_000;

pub const MIN_INGREDIENTS: usize = 3;
pub const MIN_INSTRUCTIONS: usize = 2;

pub const MAX_BULLET_LEN: usize = 180;
pub const STAPLE_PHRASE_MAX_LEN: usize = 40;
pub const SECTION_HEADER_MAX_LEN: usize = 50;

/// Glyph printed before each ingredient by WPRM-style recipe cards.
pub const CHECKBOX_GLYPH: char = '▢';

pub const ACTION_VERBS: &[&str] = &[
    "add", "place", "roast", "sauté", "simmer", "bring", "blitz", "serve", "preheat", "squeeze",
    "pour", "bake", "cook", "arrange",
];

pub const MEASUREMENT_UNITS: &[&str] = &[
    "cup", "cups", "tsp", "tbsp", "g", "kg", "ml", "l", "oz", "lb", "lbs", "clove", "cloves",
    "leaf", "leaves", "sheet", "sheets", "bunch", "bunches", "stick", "sticks", "pinch",
    "pinches", "litre", "litres",
];

pub const VULGAR_FRACTIONS: &[char] = &[
    '¼', '½', '¾', '⅐', '⅑', '⅒', '⅓', '⅔', '⅕', '⅖', '⅗', '⅘', '⅙', '⅚', '⅛', '⅜', '⅝', '⅞',
];

pub const STAPLE_INGREDIENTS: &[&str] = &[
    "salt", "pepper", "cheese", "basil", "cream", "tomato", "onion", "garlic",
];

/// Headings without a trailing colon that still name a dish component.
pub const COMPONENT_KEYWORDS: &[&str] = &[
    "sauce", "ragu", "ragù", "bolognese", "lasagn", "bechamel", "béchamel",
];

pub const INGREDIENTS_HEADING: &str = "ingredients";
pub const INSTRUCTION_HEADINGS: &[&str] = &["instructions", "method", "directions"];

pub const DEFAULT_TITLE: &str = "Untitled Recipe";
pub const NO_COMMENTS_SENTINEL: &str = "No comments found";

pub const EXTRACTION_FAILED_HINT: &str =
    "Failed to extract recipe. Make sure the URL is valid and contains a recipe.";

pub(crate) const THINK_STRIPPER: &str = r"<think>[\s\S]*</think>\s*";

pub(crate) const CODE_FENCE: &str = r"```(?:json)?[ \t]*\n?";

pub(crate) const DEFAULT_EXTRACTION_PROMPT: &str = r#"Extract recipe information from this HTML content of {url}. Look for recipe cards, structured data, or recipe sections.

{html}

Extract and return ONLY a JSON object with this exact structure:
{
  "title": "Recipe title",
  "servings": "Number of servings (e.g., '16 brownies', '4 servings')",
  "prepTime": "Prep time (e.g., '5 minutes', '15 mins')",
  "cookTime": "Cook time (e.g., '45 minutes', '1 hour')",
  "ingredients": ["1 1/2 cups granulated sugar", "3/4 cup all-purpose flour"],
  "instructions": ["Preheat the oven to 325°F", "Bake for 40 to 48 minutes"],
  "sourceUrl": "{url}",
  "commentsSummary": "Short prose summary of tips and modifications from reader comments, or 'No comments found'"
}

Instructions for extraction:
- Look for ingredients lists (often marked with "Ingredients" heading)
- Look for numbered or bulleted instruction steps
- Extract prep/cook times from recipe metadata or headings
- Include exact measurements and quantities
- Keep instructions as separate steps
- Ignore ads, equipment lists, and notes unless they're critical instructions

Return ONLY valid JSON. No other text."#;

pub(crate) const DEFAULT_COMMENTS_PROMPT: &str = r#"Below is the visible text near the end of the recipe page {url}.
Summarize in two or three sentences the useful tips, substitutions and modifications that readers shared in the comments.
Only use what readers actually wrote. If there are no reader comments, answer exactly "No comments found".

{text}"#;
