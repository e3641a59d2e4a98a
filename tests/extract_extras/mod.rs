#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ladle::{ExtractContext, ExtractionConfig};
use llm::{
    chat::{ChatMessage, ChatProvider, ChatResponse, Tool},
    error::LLMError,
};

#[macro_export]
macro_rules! assert_bullets {
    (
        $(
            $test_name:ident : $bullet:expr => $expected:expr
        ),+ $(,)?
    ) => {
        $(
            #[test]
            fn $test_name() {
                let rules = ladle::IngredientRules::default();
                let result = ladle::sections::looks_like_ingredient($bullet, &rules);

                assert_that(&result).is_equal_to($expected);
            }
        )+
    }
}

pub(crate) fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_owned()).collect()
}

pub(crate) fn context<'a>(
    model: Option<&'a dyn ChatProvider>,
    summary_model: Option<&'a dyn ChatProvider>,
) -> ExtractContext<'a> {
    ExtractContext {
        model,
        summary_model,
        prompt_template: None,
        rate_limiter: None,
        config: ExtractionConfig::default(),
    }
}

pub(crate) fn json_ld_page(json: &str) -> String {
    format!(
        r#"<html><head><title>Site</title>
<script type="application/ld+json">{json}</script>
</head><body><nav><ul><li>Home</li><li>About</li></ul></nav>
<p>My grandmother made this every Sunday.</p></body></html>"#
    )
}

pub(crate) const GRAPH_RECIPE: &str = r#"{
  "@context": "https://schema.org",
  "@graph": [
    {"@type": "WebSite", "name": "Kitchen"},
    {"@type": "BreadcrumbList", "itemListElement": []},
    {
      "@type": ["Recipe", "NewsArticle"],
      "name": "Weeknight Tomato Pasta",
      "recipeYield": ["4", "4 servings"],
      "prepTime": "PT10M",
      "totalTime": "PT30M",
      "recipeIngredient": ["400 g spaghetti", "2 tbsp olive oil", "3 cloves garlic", "1 can tomatoes"],
      "recipeInstructions": [
        {"@type": "HowToStep", "text": "Boil the pasta."},
        {"@type": "HowToStep", "text": "Fry the garlic in oil."},
        {"@type": "HowToStep", "name": "Add tomatoes and simmer."}
      ]
    }
  ]
}"#;

pub(crate) const MICRODATA_PAGE: &str = r#"<html><head><title>Lemon Bars | Bakes</title></head><body>
<div itemscope itemtype="https://schema.org/Recipe">
  <h1 itemprop="name">Lemon Bars</h1>
  <meta itemprop="prepTime" content="PT15M">
  <meta itemprop="cookTime" content="PT40M">
  <span itemprop="recipeYield">16 bars</span>
  <ul>
    <li itemprop="recipeIngredient">1 cup flour</li>
    <li itemprop="recipeIngredient">½ cup butter</li>
    <li itemprop="recipeIngredient">2 lemons</li>
  </ul>
  <ol>
    <li itemprop="recipeInstructions">Press the crust into the pan.</li>
    <li itemprop="recipeInstructions">Pour over the filling and bake.</li>
  </ol>
</div>
</body></html>"#;

pub(crate) struct StubLlmProvider {
    response: Result<String, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_prompt: Mutex<String>,
}

impl StubLlmProvider {
    pub fn new(response: &str) -> Self {
        StubLlmProvider {
            response: Ok(response.to_owned()),
            delay: None,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(String::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        StubLlmProvider {
            response: Err(message.to_owned()),
            ..Self::new("")
        }
    }

    pub fn slow(response: &str, delay: Duration) -> Self {
        StubLlmProvider {
            delay: Some(delay),
            ..Self::new(response)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> String {
        self.last_prompt.lock().expect("prompt mutex").clone()
    }
}

#[derive(Debug)]
struct StringResponse(String);

impl ChatResponse for StringResponse {
    fn text(&self) -> Option<String> {
        Some(self.0.clone())
    }

    fn tool_calls(&self) -> Option<Vec<llm::ToolCall>> {
        None
    }

    fn thinking(&self) -> Option<String> {
        None
    }

    fn usage(&self) -> Option<llm::chat::Usage> {
        None
    }
}

impl std::fmt::Display for StringResponse {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl ChatProvider for StubLlmProvider {
    fn chat<'life0, 'life1, 'async_trait>(
        &'life0 self,
        messages: &'life1 [ChatMessage],
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Box<dyn ChatResponse>, LLMError>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().expect("prompt mutex") = format!("{messages:?}");

        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            match &self.response {
                Ok(text) => {
                    Ok(Box::new(StringResponse(text.clone())) as Box<dyn ChatResponse>)
                }
                Err(message) => Err(LLMError::ProviderError(message.clone())),
            }
        })
    }

    fn chat_with_tools<'life0, 'life1, 'life2, 'async_trait>(
        &'life0 self,
        messages: &'life1 [ChatMessage],
        _tools: Option<&'life2 [Tool]>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Box<dyn ChatResponse>, LLMError>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        'life2: 'async_trait,
        Self: 'async_trait,
    {
        self.chat(messages)
    }
}
