//! Search request construction.
//!
//! Turns a free-text query and a 1-based page number into the absolute GET
//! URL for the product search endpoint. Query values are percent-encoded by
//! [`Url`]'s serializer, never by string interpolation.
//!
//! # Example
//!
//! ```rust
//! use product_showcase::SearchRequest;
//! let url = SearchRequest::new("jeans").page(2).build().unwrap();
//! assert_eq!(
//!     url.as_str(),
//!     "https://api.hm.com/search-services/v1/sv_se/search/resultpage?touchPoint=ios&query=jeans&page=2"
//! );
//! ```

use reqwest::Url;

use crate::config;
use crate::error::{ProductError, Result};

/// Builds the URL for one search results page.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    base: Option<Url>,
    query: String,
    page: u32,
}

impl SearchRequest {
    /// Create a request for the first page of `query` against the default host.
    pub fn new(query: &str) -> Self {
        Self {
            base: None,
            query: query.to_string(),
            page: 1,
        }
    }

    /// Target a different host, e.g. a mock server in tests.
    pub fn base_url(mut self, base: Url) -> Self {
        self.base = Some(base);
        self
    }

    /// Set the 1-based page number.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Build the final URL.
    ///
    /// Fails with [`ProductError::InvalidRequest`] when the page is zero or
    /// the base URL cannot carry a path (e.g. `mailto:` URLs).
    pub fn build(&self) -> Result<Url> {
        if self.page == 0 {
            return Err(ProductError::InvalidRequest(
                "page numbers start at 1".to_string(),
            ));
        }

        let mut url = match &self.base {
            Some(base) => base.clone(),
            None => Url::parse(config::API_BASE)
                .map_err(|e| ProductError::InvalidRequest(e.to_string()))?,
        };
        if url.cannot_be_a_base() {
            return Err(ProductError::InvalidRequest(format!(
                "{} cannot be used as a base URL",
                url
            )));
        }

        url.set_path(config::SEARCH_PATH);
        url.query_pairs_mut()
            .clear()
            .append_pair("touchPoint", config::TOUCH_POINT)
            .append_pair("query", &self.query)
            .append_pair("page", &self.page.to_string());
        Ok(url)
    }
}
