//! The fetch module downloads the raw markup of a recipe page.

use log::debug;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};
use url::Url;

use crate::config::FetchConfig;
use crate::error::ExtractError;
use crate::recipe::RawPage;

/// HTTP client configured to look like a desktop browser and bypass caches.
/// Build it once and reuse it across URLs.
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    /// Creates a fetcher from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    /// (for example, an invalid User-Agent value or TLS backend failure).
    pub fn new(config: &FetchConfig) -> Result<Self, ExtractError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(ExtractError::Client)?;

        Ok(Self { client })
    }

    /// Fetches the page at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::PageFetch`] if the request fails, times out,
    /// answers with a non-success status or its body cannot be read.
    pub async fn fetch(&self, url: &Url) -> Result<RawPage, ExtractError> {
        let fetch_error = |source| ExtractError::PageFetch {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fetch_error)?;

        let html = response.text().await.map_err(fetch_error)?;
        debug!("Fetched {} bytes from {url}", html.len());

        Ok(RawPage::new(url.as_str(), html))
    }
}
