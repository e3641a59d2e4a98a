use std::time::Duration;

use thiserror::Error;

use crate::constants::EXTRACTION_FAILED_HINT;

/// Failures that cross the extraction boundary. Structural strategies never
/// fail; they simply contribute nothing and the pipeline moves on.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid recipe URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unable to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to fetch recipe page {url}: {source}")]
    PageFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("No language model is configured for generative extraction. {hint}", hint = EXTRACTION_FAILED_HINT)]
    ModelUnavailable,

    #[error("Language model request failed: {0}. {hint}", hint = EXTRACTION_FAILED_HINT)]
    Model(String),

    #[error("Language model request timed out after {0:?}. {hint}", hint = EXTRACTION_FAILED_HINT)]
    ModelTimeout(Duration),

    #[error("Invalid JSON response from the language model: {0}. {hint}", hint = EXTRACTION_FAILED_HINT)]
    GenerativeParse(String),
}

impl ExtractError {
    /// The single message shown to end users on total failure.
    pub const USER_MESSAGE: &'static str = EXTRACTION_FAILED_HINT;

    /// Whether the page itself could not be obtained, as opposed to extraction failing.
    #[must_use]
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl { .. } | Self::Client(_) | Self::PageFetch { .. }
        )
    }
}
