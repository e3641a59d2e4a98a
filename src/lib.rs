//! The ladle library turns an arbitrary recipe web page into a structured
//! recipe record.
//!
//! Extraction falls back through strategies of decreasing reliability:
//! schema.org JSON-LD, then microdata and heading-adjacent lists (both
//! optionally improved by section-aware ingredient recovery), and finally a
//! language model reading the raw markup.

pub mod compose;
pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod generate;
pub mod jsonld;
pub mod markup;
pub mod microdata;
pub mod recipe;
pub mod sections;
pub mod storage;
pub mod text;

pub use compose::compose;
pub use config::{ExtractionConfig, FetchConfig, IngredientRules, UsabilityThreshold};
pub use error::ExtractError;
pub use extract::{ExtractContext, Extraction, ExtractionMethod, extract_page, extract_recipe};
pub use fetch::PageFetcher;
pub use recipe::{ExtractionCandidate, RawPage, Recipe};
